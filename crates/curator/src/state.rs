//! Run state kept on disk between invocations.
//!
//! Two files live in the state directory, each overwritten wholesale:
//!
//! - `preference.json`: the last synthesized preference and when it was generated
//! - `new_papers.json`: papers added by the most recent ingestion run

use super::*;

/// File holding the cached preference.
pub const PREFERENCE_FILE: &str = "preference.json";
/// File holding the latest run's additions.
pub const NEW_PAPERS_FILE: &str = "new_papers.json";

/// A synthesized preference with its generation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPreference {
  /// Free-text interest description
  pub preference:   String,
  /// When it was synthesized
  pub generated_at: DateTime<Utc>,
}

/// Handle on the state directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunState {
  /// Directory holding the state files
  dir: PathBuf,
}

impl RunState {
  /// State rooted at `dir`; nothing is created until the first write.
  pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

  /// The state directory.
  pub fn dir(&self) -> &Path { &self.dir }

  /// Path of the preference file.
  pub fn preference_path(&self) -> PathBuf { self.dir.join(PREFERENCE_FILE) }

  /// Path of the new-papers file.
  pub fn new_papers_path(&self) -> PathBuf { self.dir.join(NEW_PAPERS_FILE) }

  /// The cached preference, `None` if none has been saved.
  pub fn load_preference(&self) -> Result<Option<StoredPreference>> {
    let path = self.preference_path();
    if !path.exists() {
      debug!("No cached preference at {}", path.display());
      return Ok(None);
    }
    let contents = std::fs::read_to_string(&path)?;
    Ok(Some(serde_json::from_str(&contents)?))
  }

  /// Replaces the cached preference.
  pub fn save_preference(&self, preference: &StoredPreference) -> Result<()> {
    self.write(&self.preference_path(), &serde_json::to_string_pretty(preference)?)
  }

  /// Papers from the last run; empty if no run has saved any.
  pub fn load_new_papers(&self) -> Result<Vec<ScoredPaper>> {
    let path = self.new_papers_path();
    if !path.exists() {
      warn!("{} not found, no papers to export", path.display());
      return Ok(Vec::new());
    }
    let contents = std::fs::read_to_string(&path)?;
    Ok(serde_json::from_str(&contents)?)
  }

  /// Replaces the saved paper list.
  pub fn save_new_papers(&self, papers: &[ScoredPaper]) -> Result<()> {
    self.write(&self.new_papers_path(), &serde_json::to_string_pretty(papers)?)
  }

  /// Writes `contents` to `path`, creating the state directory first.
  fn write(&self, path: &Path, contents: &str) -> Result<()> {
    std::fs::create_dir_all(&self.dir)?;
    std::fs::write(path, contents)?;
    debug!("Wrote {}", path.display());
    Ok(())
  }
}

//! Configuration and credentials.
//!
//! Settings live in a TOML file (`~/.curator/config.toml` by default) where every section is
//! optional; secrets never do. Credentials are read from the environment with
//! [`Credentials::from_env`].
//!
//! ```toml
//! state_dir = "/var/lib/curator"
//! interest_prefix = "I work on efficient inference."
//!
//! [feed]
//! categories = ["cs.LG", "cs.CL"]
//!
//! [run]
//! past_days = 3
//! max_papers = 10
//! ```

use super::*;

/// Environment variable holding the Notion integration token.
pub const NOTION_TOKEN_VAR: &str = "NOTION_API_TOKEN";
/// Environment variable holding the Notion database id.
pub const NOTION_DB_VAR: &str = "NOTION_DB_ID";
/// Environment variable holding the OpenAI API key.
pub const OPENAI_KEY_VAR: &str = "OPENAI_API_KEY";

/// Interest statement used when the configuration file does not provide one.
pub const DEFAULT_INTEREST_PREFIX: &str = "My primary research interest lies in enhancing the \
                                           runtime efficiency of ML models, which encompasses \
                                           areas such as quantization, pruning, and innovative \
                                           compression techniques. Additionally, I am intrigued \
                                           by AI systems, AI hardware and AI safety research. \
                                           Some of my previous research has investigated \
                                           efficient model serving systems, new AI hardware \
                                           accelerators and red-teaming AI models. I am also \
                                           keen to discover emerging models and learning \
                                           paradigms.";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// arXiv client settings
  pub feed:            FeedConfig,
  /// Language-model endpoint settings
  pub llm:             LlmConfig,
  /// Notion API settings
  pub notion:          NotionConfig,
  /// Defaults for an ingestion run
  pub run:             RunConfig,
  /// Static export targets
  pub export:          ExportConfig,
  /// Directory holding the cached preference and the last run's papers
  pub state_dir:       PathBuf,
  /// Fixed statement of research interest fed to preference synthesis
  pub interest_prefix: String,
}

/// Settings for [`ArxivClient`](crate::feed::ArxivClient).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
  /// Atom query endpoint
  pub endpoint:     String,
  /// Subject categories OR-ed together in the listing query
  pub categories:   Vec<String>,
  /// Feed-side cap on listed candidates
  pub max_results:  usize,
  /// Timeout for the listing request
  pub timeout_secs: u64,
  /// Retry policy for title lookups
  pub lookup:       RetryPolicy,
}

/// Bounded retry with a fixed wait, used only by title lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
  /// Total attempts, including the first
  pub max_attempts:    u32,
  /// Fixed pause between attempts
  pub retry_wait_secs: u64,
  /// Per-attempt timeout
  pub timeout_secs:    u64,
}

/// Settings for [`OpenAiClient`](crate::llm::OpenAiClient).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
  /// API base, without the `/chat/completions` suffix
  pub base_url: String,
  /// Model identifier sent with every request
  pub model:    String,
}

/// Settings for [`NotionClient`](crate::store::NotionClient).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotionConfig {
  /// API base
  pub base_url: String,
  /// Value of the `Notion-Version` header
  pub version:  String,
}

/// Defaults for an ingestion run, overridable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
  /// Lookback window in days
  pub past_days:  u32,
  /// Advisory cap on papers the model should return
  pub max_papers: usize,
}

/// Where `export` writes its artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
  /// Human-readable page
  pub markdown_path: PathBuf,
  /// Machine-readable document
  pub json_path:     PathBuf,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      feed:            FeedConfig::default(),
      llm:             LlmConfig::default(),
      notion:          NotionConfig::default(),
      run:             RunConfig::default(),
      export:          ExportConfig::default(),
      state_dir:       Self::default_state_dir(),
      interest_prefix: DEFAULT_INTEREST_PREFIX.to_string(),
    }
  }
}

impl Default for FeedConfig {
  fn default() -> Self {
    Self {
      endpoint:     "https://export.arxiv.org/api/query".to_string(),
      categories:   vec!["cs.LG".to_string(), "cs.AI".to_string(), "cs.AR".to_string()],
      max_results:  1000,
      timeout_secs: 10,
      lookup:       RetryPolicy::default(),
    }
  }
}

impl Default for RetryPolicy {
  fn default() -> Self { Self { max_attempts: 3, retry_wait_secs: 2, timeout_secs: 5 } }
}

impl Default for LlmConfig {
  fn default() -> Self {
    Self { base_url: "https://api.openai.com/v1".to_string(), model: "gpt-4.1".to_string() }
  }
}

impl Default for NotionConfig {
  fn default() -> Self {
    Self { base_url: "https://api.notion.com/v1".to_string(), version: "2022-06-28".to_string() }
  }
}

impl Default for RunConfig {
  fn default() -> Self { Self { past_days: 7, max_papers: 5 } }
}

impl Default for ExportConfig {
  fn default() -> Self {
    Self {
      markdown_path: PathBuf::from("docs/index.md"),
      json_path:     PathBuf::from("docs/papers.json"),
    }
  }
}

impl Config {
  /// Returns the default configuration file path, `~/.curator/config.toml`.
  ///
  /// # Errors
  ///
  /// Returns [`CuratorError::MissingConfiguration`] when no home directory can be determined.
  pub fn default_path() -> Result<PathBuf> {
    dirs::home_dir()
      .map(|home| home.join(".curator").join("config.toml"))
      .ok_or_else(|| CuratorError::MissingConfiguration("home directory not found".into()))
  }

  /// Default run state directory, `~/.curator/state`, falling back to `./.curator/state`.
  pub fn default_state_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".curator").join("state")
  }

  /// Loads configuration from `path`, using defaults when the file does not exist.
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    if !path.exists() {
      debug!("No configuration at {}, using defaults", path.display());
      return Ok(Self::default());
    }
    let content = std::fs::read_to_string(path)?;
    Self::from_toml(&content)
  }

  /// Parses configuration from a TOML string.
  pub fn from_toml(content: &str) -> Result<Self> { Ok(toml::from_str(content)?) }
}

/// Secrets for the external services, sourced from the environment.
#[derive(Clone)]
pub struct Credentials {
  /// Notion integration token
  pub notion_token:   String,
  /// Notion database holding the collection
  pub notion_db_id:   String,
  /// OpenAI API key
  pub openai_api_key: String,
}

impl std::fmt::Debug for Credentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Credentials")
      .field("notion_token", &"***")
      .field("notion_db_id", &self.notion_db_id)
      .field("openai_api_key", &"***")
      .finish()
  }
}

impl Credentials {
  /// Reads all credentials from the process environment.
  ///
  /// # Errors
  ///
  /// Returns [`CuratorError::MissingConfiguration`] naming the first variable that is unset or
  /// blank.
  pub fn from_env() -> Result<Self> { Self::from_lookup(|key| std::env::var(key).ok()) }

  /// Reads credentials through an arbitrary lookup, for callers that do not use the process
  /// environment.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let require = |key: &str| {
      lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| CuratorError::MissingConfiguration(format!("{key} is not set")))
    };
    Ok(Self {
      notion_token:   require(NOTION_TOKEN_VAR)?,
      notion_db_id:   require(NOTION_DB_VAR)?,
      openai_api_key: require(OPENAI_KEY_VAR)?,
    })
  }
}

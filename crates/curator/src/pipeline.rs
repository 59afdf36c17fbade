//! The ingestion state machine.
//!
//! A run walks through these stages in order:
//!
//! ```text
//! Idle → FetchingCandidates → Summarizing → Extracting → Deduplicating → Persisting → Done
//! ```
//!
//! Any error moves the run to [`IngestStage::Failed`] and is returned to the caller. Writes
//! already made to the store are not rolled back.
//!
//! The model is consulted twice: once to shortlist the candidates in prose, then again to
//! extract that prose into [`ScoredPaper`] records. The paper cap travels only as text in the
//! first prompt; nothing here enforces it.

use super::*;
use crate::{
  feed::FeedWindow,
  llm::OutputSchema,
  store::NewEntry,
};

/// System instruction for the structured-extraction call.
pub const EXTRACTION_INSTRUCTION: &str = "Extract the paper information.";

/// Where an [`Ingestor`] is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IngestStage {
  /// Not started, or building the collection index
  #[default]
  Idle,
  /// Listing recent papers from the feed
  FetchingCandidates,
  /// Asking the model for a prose shortlist
  Summarizing,
  /// Asking the model to structure the shortlist
  Extracting,
  /// Dropping papers already in the collection
  Deduplicating,
  /// Writing new papers to the store
  Persisting,
  /// Finished successfully
  Done,
  /// Stopped on an error
  Failed,
}

impl Display for IngestStage {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let name = match self {
      Self::Idle => "idle",
      Self::FetchingCandidates => "fetching candidates",
      Self::Summarizing => "summarizing",
      Self::Extracting => "extracting",
      Self::Deduplicating => "deduplicating",
      Self::Persisting => "persisting",
      Self::Done => "done",
      Self::Failed => "failed",
    };
    f.write_str(name)
  }
}

/// Per-run knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
  /// Lookback window in days
  pub past_days:  u32,
  /// Cap stated to the model in the shortlist prompt
  pub max_papers: usize,
  /// Cap on candidates requested from the feed
  pub feed_cap:   usize,
}

impl Default for IngestOptions {
  fn default() -> Self { Self { past_days: 7, max_papers: 5, feed_cap: 1000 } }
}

impl IngestOptions {
  /// Options from the configured run and feed defaults.
  pub fn from_config(config: &Config) -> Self {
    Self {
      past_days:  config.run.past_days,
      max_papers: config.run.max_papers,
      feed_cap:   config.feed.max_results,
    }
  }
}

/// Drives one ingestion run over the three collaborators.
pub struct Ingestor<'a> {
  /// Candidate source
  feed:       &'a dyn FeedSource,
  /// Ranking and extraction model
  scorer:     &'a dyn ScoringGateway,
  /// Collection the run appends to
  store:      &'a dyn DocumentStore,
  /// Feed categories to list
  categories: Vec<String>,
  /// Current stage
  stage:      IngestStage,
}

impl<'a> Ingestor<'a> {
  /// Creates an idle ingestor.
  pub fn new(
    feed: &'a dyn FeedSource,
    scorer: &'a dyn ScoringGateway,
    store: &'a dyn DocumentStore,
    categories: Vec<String>,
  ) -> Self {
    Self { feed, scorer, store, categories, stage: IngestStage::Idle }
  }

  /// The stage the last run reached.
  pub fn stage(&self) -> IngestStage { self.stage }

  /// Runs ingestion for a window ending now.
  ///
  /// Returns the papers newly written to the store, in the model's order.
  pub async fn run(
    &mut self,
    preference: &str,
    options: &IngestOptions,
  ) -> Result<Vec<ScoredPaper>> {
    self.run_at(preference, options, Utc::now()).await
  }

  /// Runs ingestion for a window ending at `now`.
  pub async fn run_at(
    &mut self,
    preference: &str,
    options: &IngestOptions,
    now: DateTime<Utc>,
  ) -> Result<Vec<ScoredPaper>> {
    self.stage = IngestStage::Idle;
    match self.execute(preference, options, now).await {
      Ok(added) => {
        self.transition(IngestStage::Done);
        info!("Ingestion added {} papers", added.len());
        Ok(added)
      },
      Err(e) => {
        error!("Ingestion failed while {}: {e}", self.stage);
        self.transition(IngestStage::Failed);
        Err(e)
      },
    }
  }

  /// Moves to `next`, logging the change.
  fn transition(&mut self, next: IngestStage) {
    info!("Ingestion stage: {} -> {next}", self.stage);
    self.stage = next;
  }

  /// The stages proper; the caller records the terminal stage.
  async fn execute(
    &mut self,
    preference: &str,
    options: &IngestOptions,
    now: DateTime<Utc>,
  ) -> Result<Vec<ScoredPaper>> {
    let index = CollectionIndex::build(self.store).await?;

    self.transition(IngestStage::FetchingCandidates);
    let window = FeedWindow::past_days(now, options.past_days)?;
    let candidates = self.feed.fetch_recent(window, &self.categories, options.feed_cap).await?;
    info!("Fetched {} candidate papers", candidates.len());

    self.transition(IngestStage::Summarizing);
    let prompt = build_relevance_prompt(preference, options.max_papers, &candidates);
    let shortlist = self.scorer.complete_text(&prompt).await?;
    trace!("Shortlist: {shortlist}");

    self.transition(IngestStage::Extracting);
    let value = self
      .scorer
      .complete_structured(EXTRACTION_INSTRUCTION, &shortlist, &OutputSchema::paper_list())
      .await?;
    let scored = PaperList::from_value(value)?.papers;
    debug!("Extracted {} papers", scored.len());

    self.transition(IngestStage::Deduplicating);
    let novel = deduplicate(&index, scored);

    self.transition(IngestStage::Persisting);
    self.persist(&novel).await?;
    Ok(novel)
  }

  /// Creates one store entry per paper, stopping at the first failure.
  async fn persist(&self, papers: &[ScoredPaper]) -> Result<()> {
    for (persisted, paper) in papers.iter().enumerate() {
      match self.store.create(&NewEntry::from(paper)).await {
        Ok(id) => debug!("Created entry {id} for \"{}\"", paper.name),
        Err(e) =>
          return Err(CuratorError::PartialPersist {
            persisted,
            attempted: papers.len(),
            source: Box::new(e),
          }),
      }
    }
    Ok(())
  }
}

/// Builds the shortlist prompt: preference, cap, then one line per candidate.
pub fn build_relevance_prompt(
  preference: &str,
  max_papers: usize,
  candidates: &[CandidatePaper],
) -> String {
  let lines: Vec<String> = candidates.iter().map(CandidatePaper::prompt_line).collect();
  format!(
    "The user provided the following research interest description: {preference}Please return \
     a list of papers (max {max_papers}) that are most relevant to the research interests based \
     on the following papers:\n{}",
    lines.join("\n")
  )
}

/// Keeps the first occurrence of each name not already in `index`, preserving order.
///
/// Names are trimmed first, matching how the store reports titles. The index is a snapshot
/// from the start of the run, so repeats within `papers` are caught by a separate seen-set
/// rather than by the index.
pub fn deduplicate(index: &CollectionIndex, papers: Vec<ScoredPaper>) -> Vec<ScoredPaper> {
  let mut seen = HashSet::new();
  papers
    .into_iter()
    .map(|mut paper| {
      if paper.name.trim().len() != paper.name.len() {
        paper.name = paper.name.trim().to_string();
      }
      paper
    })
    .filter(|paper| {
      if index.contains(&paper.name) {
        debug!("Skipping \"{}\": already in the collection", paper.name);
        return false;
      }
      if !seen.insert(paper.name.clone()) {
        debug!("Skipping \"{}\": repeated in this run", paper.name);
        return false;
      }
      true
    })
    .collect()
}

//! The external document store holding the curated collection.
//!
//! The store is only ever read or appended to by the ingestion path. Its interface keeps one
//! external constraint visible: the bulk [`DocumentStore::list`] call yields names, ids and
//! presence flags, but not ratings or abstract text. Reading those costs one
//! [`DocumentStore::retrieve`] per entry.

use std::str::FromStr;

use super::*;

mod index;
mod notion;

pub use index::CollectionIndex;
pub use notion::NotionClient;

/// Operations the pipeline needs from the document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
  /// Full listing of the collection, paging handled internally.
  async fn list(&self) -> Result<Vec<StoreListing>>;

  /// One entry with its rating and abstract.
  ///
  /// Fails with [`CuratorError::NotFound`] when no entry has `id`.
  async fn retrieve(&self, id: &str) -> Result<StoreEntry>;

  /// Appends an entry and returns its store id.
  async fn create(&self, entry: &NewEntry) -> Result<String>;

  /// Patches the fields present in `patch`, leaving others untouched.
  async fn update(&self, id: &str, patch: &EntryPatch) -> Result<()>;
}

/// What the bulk listing reveals about an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreListing {
  /// Opaque store key
  pub id:           String,
  /// Display name (paper title)
  pub name:         String,
  /// Link, if set
  pub url:          Option<String>,
  /// Whether the abstract field holds any text
  pub has_abstract: bool,
}

/// A fully retrieved entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEntry {
  /// Opaque store key
  pub id:            String,
  /// Display name (paper title)
  pub name:          String,
  /// Link, if set
  pub url:           Option<String>,
  /// Abstract text, if set
  pub abstract_text: Option<String>,
  /// Owner's rating, if set
  pub rating:        Option<Rating>,
}

/// Fields written when appending a paper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
  /// Display name
  pub name:          String,
  /// Link, `None` when no arXiv id was extracted
  pub url:           Option<String>,
  /// Abstract text
  pub abstract_text: String,
}

impl From<&ScoredPaper> for NewEntry {
  fn from(paper: &ScoredPaper) -> Self {
    Self {
      name:          paper.name.trim().to_string(),
      url:           paper.abs_url(),
      abstract_text: paper.summary.clone(),
    }
  }
}

/// Partial update of an entry; `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPatch {
  /// New link
  pub url:           Option<String>,
  /// New abstract text
  pub abstract_text: Option<String>,
}

impl EntryPatch {
  /// Whether the patch would change nothing.
  pub fn is_empty(&self) -> bool { self.url.is_none() && self.abstract_text.is_none() }
}

/// The owner's score for an entry on the 1–5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rating(u8);

/// How a rating steers preference synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
  /// Rated 4 or 5
  Liked,
  /// Rated 3
  Neutral,
  /// Rated 1 or 2
  Disliked,
}

impl Rating {
  /// Lowest rating on the scale.
  pub const MIN: u8 = 1;
  /// Highest rating on the scale.
  pub const MAX: u8 = 5;

  /// Validates a raw score.
  pub fn new(value: u8) -> Option<Self> {
    (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
  }

  /// The raw score.
  pub fn value(self) -> u8 { self.0 }

  /// Which side of the preference prompt this rating lands on.
  pub fn sentiment(self) -> Sentiment {
    match self.0 {
      4 | 5 => Sentiment::Liked,
      1 | 2 => Sentiment::Disliked,
      _ => Sentiment::Neutral,
    }
  }
}

impl FromStr for Rating {
  type Err = CuratorError;

  fn from_str(s: &str) -> Result<Self> {
    s.trim()
      .parse::<u8>()
      .ok()
      .and_then(Rating::new)
      .ok_or_else(|| CuratorError::InvalidRating(s.to_string()))
  }
}

impl Display for Rating {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

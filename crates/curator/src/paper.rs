//! Paper records flowing through a curation run.
//!
//! Two shapes exist, one on each side of the model:
//!
//! - [`CandidatePaper`]: a fresh arXiv listing entry, produced by the feed client and discarded
//!   once the relevance prompt has been built.
//! - [`ScoredPaper`]: what the model's structured extraction hands back. It is the only record
//!   that is persisted (to the document store, to run state and to the static export).
//!
//! # Examples
//!
//! ```
//! use curator::paper::ScoredPaper;
//!
//! let paper = ScoredPaper {
//!   name:     "Sparse Attention at Scale".to_string(),
//!   arxiv_id: "2401.12345".to_string(),
//!   summary:  "We prune attention heads.".to_string(),
//!   authors:  "A. Author, B. Author".to_string(),
//! };
//! assert_eq!(paper.abs_url().as_deref(), Some("https://arxiv.org/abs/2401.12345"));
//! ```

use super::*;

/// Base of every canonical arXiv abstract link.
pub const ARXIV_ABS_BASE: &str = "https://arxiv.org/abs/";

/// A recently submitted paper as listed by the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePaper {
  /// Whitespace-normalised title
  pub title:        String,
  /// Author names in listing order
  pub authors:      Vec<String>,
  /// Publication timestamp reported by the feed
  pub published_at: DateTime<Utc>,
  /// Feed-native identifier, the abs-page URL for arXiv
  pub source_id:    String,
  /// Abstract text
  pub summary:      String,
}

impl CandidatePaper {
  /// Renders this candidate as one line of the relevance prompt.
  pub fn prompt_line(&self) -> String {
    format!(
      "{} by {} with the following summary {}, it has the following arxiv id {}",
      self.title,
      self.authors.join(", "),
      self.summary,
      self.source_id
    )
  }
}

/// A paper selected by the model and extracted into a fixed shape.
///
/// `arxiv_id` is expected to be a bare identifier such as `2401.12345`; nothing upstream
/// validates that, so [`ScoredPaper::abs_url`] tolerates a full link as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredPaper {
  /// Paper title, used as the store-side display name
  pub name:     String,
  /// Bare arXiv identifier, possibly empty
  pub arxiv_id: String,
  /// Abstract or model-written summary
  pub summary:  String,
  /// Comma-joined author names
  pub authors:  String,
}

impl ScoredPaper {
  /// Canonical abstract link, or `None` when no identifier was extracted.
  pub fn abs_url(&self) -> Option<String> { abs_url(&self.arxiv_id) }
}

/// Envelope the structured extraction is asked to fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperList {
  /// Extracted papers in the order the model listed them
  pub papers: Vec<ScoredPaper>,
}

impl PaperList {
  /// Name reported to the model for the extraction schema.
  pub const SCHEMA_NAME: &'static str = "list_of_papers";

  /// Strict JSON schema describing a [`PaperList`].
  pub fn schema() -> Value {
    serde_json::json!({
      "type": "object",
      "properties": {
        "papers": {
          "type": "array",
          "items": {
            "type": "object",
            "properties": {
              "name": { "type": "string" },
              "arxiv_id": { "type": "string" },
              "summary": { "type": "string" },
              "authors": { "type": "string" }
            },
            "required": ["name", "arxiv_id", "summary", "authors"],
            "additionalProperties": false
          }
        }
      },
      "required": ["papers"],
      "additionalProperties": false
    })
  }

  /// Coerces a structured completion into a [`PaperList`].
  ///
  /// # Errors
  ///
  /// Returns [`CuratorError::SchemaValidation`] when the value does not have the expected shape.
  pub fn from_value(value: Value) -> Result<Self> {
    serde_json::from_value(value).map_err(|e| CuratorError::SchemaValidation(e.to_string()))
  }
}

/// Builds the canonical abstract link for an arXiv identifier.
///
/// Blank identifiers yield `None`. A value that is already an arXiv link is reduced to its
/// identifier first.
pub fn abs_url(arxiv_id: &str) -> Option<String> {
  let id = arxiv_id.trim();
  let id = id.rsplit_once("/abs/").map_or(id, |(_, tail)| tail).trim_matches('/');
  if id.is_empty() {
    None
  } else {
    Some(format!("{ARXIV_ABS_BASE}{id}"))
  }
}

/// Collapses runs of whitespace (arXiv wraps titles and abstracts across lines).
pub fn normalize_whitespace(text: &str) -> String {
  lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
  }
  WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

//! Error types for the curator library.
//!
//! One enum covers every failure the pipeline can surface:
//! - Transport failures talking to arXiv, the model endpoint or Notion
//! - Model output that does not fit the requested schema
//! - Missing credentials or unreadable configuration
//! - Local state and export I/O
//!
//! # Examples
//!
//! ```
//! use curator::error::CuratorError;
//!
//! fn report(err: &CuratorError) -> &'static str {
//!   match err {
//!     CuratorError::Network(_) => "transport",
//!     CuratorError::SchemaValidation(_) => "model output",
//!     CuratorError::MissingConfiguration(_) => "setup",
//!     _ => "other",
//!   }
//! }
//! ```

use thiserror::Error;

/// Error type alias used for the [`curator`](crate) crate.
pub type Result<T> = core::result::Result<T, CuratorError>;

/// Errors that can occur while curating papers.
#[derive(Error, Debug)]
pub enum CuratorError {
  /// A network request failed.
  ///
  /// This covers connection failures, timeouts and TLS errors against any of the three
  /// external services. Outside of title lookups these are never retried.
  #[error(transparent)]
  Network(#[from] reqwest::Error),

  /// An external API answered with a non-success status.
  ///
  /// The string carries the service, status and response body for debugging.
  #[error("API error: {0}")]
  ApiError(String),

  /// The arXiv Atom feed could not be decoded.
  #[error("Failed to decode feed: {0}")]
  Feed(#[from] quick_xml::DeError),

  /// The model's structured output could not be coerced to the requested schema.
  ///
  /// Surfaced to the caller as-is; the gateway never retries.
  #[error("Model output failed schema validation: {0}")]
  SchemaValidation(String),

  /// A store write failed part-way through persisting a run's papers.
  ///
  /// Entries created before the failure stay in the store.
  #[error("Persisted {persisted} of {attempted} papers before failing: {source}")]
  PartialPersist {
    /// Entries created before the failure
    persisted: usize,
    /// Entries the run tried to create
    attempted: usize,
    /// The failing create
    #[source]
    source:    Box<CuratorError>,
  },

  /// The lookback window starts before the earliest representable date.
  #[error("A {0}-day lookback window reaches past the earliest supported date")]
  InvalidWindow(u32),

  /// A Notion page or database does not exist (HTTP 404).
  #[error("Not found")]
  NotFound,

  /// A required credential or setting is absent.
  ///
  /// Raised at startup, before any external call is made.
  #[error("Missing configuration: {0}")]
  MissingConfiguration(String),

  /// A rating outside the 1–5 scale was read from the store.
  #[error("Invalid rating \"{0}\", expected an integer from 1 to 5")]
  InvalidRating(String),

  /// A model was not specified for the completion request.
  #[error("No model was chosen for the LLM.")]
  LlmMissingModel,

  /// No messages were supplied in the completion request.
  #[error("No messages were supplied to send to the LLM.")]
  LlmMissingMessage,

  /// A file system operation failed while reading or writing state or exports.
  #[error(transparent)]
  Io(#[from] std::io::Error),

  /// JSON (de)serialization failed.
  #[error(transparent)]
  Json(#[from] serde_json::Error),

  /// The configuration file is not valid TOML for [`Config`](crate::Config).
  #[error(transparent)]
  TomlDe(#[from] toml::de::Error),
}

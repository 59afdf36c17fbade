//! Personal research-paper curation library.
//!
//! `curator` keeps a Notion database of papers topped up with fresh arXiv submissions that
//! match the owner's interests. It provides:
//!
//! - Recent-paper listing and exact-title lookup against the arXiv Atom API
//! - A language-model gateway for free-text and schema-constrained completions
//! - A Notion-backed document store client
//! - An ingestion pipeline that ranks, deduplicates and persists new papers
//! - Synthesis of an interest profile from the ratings already recorded in the store
//! - Maintenance sweeps that backfill missing abstracts and links
//! - Local run state and a static export for a read-only web page
//!
//! # Getting Started
//!
//! ```no_run
//! use curator::{
//!   feed::ArxivClient,
//!   llm::OpenAiClient,
//!   pipeline::{IngestOptions, Ingestor},
//!   prelude::*,
//!   store::NotionClient,
//!   Config, Credentials,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!   let config = Config::load(Config::default_path()?)?;
//!   let credentials = Credentials::from_env()?;
//!
//!   let feed = ArxivClient::new(&config.feed)?;
//!   let scorer = OpenAiClient::new(&config.llm, &credentials.openai_api_key);
//!   let store = NotionClient::new(&config.notion, &credentials);
//!
//!   let mut ingestor = Ingestor::new(&feed, &scorer, &store, config.feed.categories.clone());
//!   let added = ingestor.run("efficient inference", &IngestOptions::default()).await?;
//!   println!("Added {} papers", added.len());
//!   Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`paper`]: Candidate and scored paper records
//! - [`feed`]: arXiv client and the [`feed::FeedSource`] seam
//! - [`llm`]: Completion requests and the [`llm::ScoringGateway`] seam
//! - [`store`]: Notion client, [`store::DocumentStore`] seam and the collection index
//! - [`pipeline`]: The ingestion state machine
//! - [`preference`]: Interest-profile synthesis
//! - [`maintenance`]: Backfill sweeps
//! - [`state`]: Run state persisted between invocations
//! - [`export`]: Markdown/JSON rendering of the latest additions

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{
  collections::{HashMap, HashSet},
  fmt::Display,
  path::{Path, PathBuf},
  time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, trace, warn};
#[cfg(test)]
use {tempfile::tempdir, tracing_test::traced_test};

pub mod configuration;
pub mod error;
pub mod export;
pub mod feed;
pub mod llm;
pub mod maintenance;
pub mod paper;
pub mod pipeline;
pub mod preference;
pub mod state;
pub mod store;

pub use configuration::{Config, Credentials};

use crate::{
  configuration::*,
  error::*,
  feed::FeedSource,
  llm::ScoringGateway,
  paper::*,
  store::{CollectionIndex, DocumentStore},
};

/// Common traits and types for ergonomic imports.
///
/// ```no_run
/// use curator::prelude::*;
///
/// fn describe(err: &CuratorError) -> String { err.to_string() }
/// ```
///
/// Currently exports:
/// - [`FeedSource`], [`ScoringGateway`] and [`DocumentStore`]: the three collaborator seams
/// - [`CuratorError`]: Core error type for the library
pub mod prelude {
  pub use crate::{
    error::CuratorError, feed::FeedSource, llm::ScoringGateway, store::DocumentStore,
  };
}

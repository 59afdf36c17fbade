//! Command line interface for the curator paper pipeline.
//!
//! Meant to be run once a day from cron or a CI schedule. Running it with no command regenerates
//! the interest profile if none is cached, ingests the last week of arXiv submissions into the
//! Notion collection and records what was added.
//!
//! # Usage
//!
//! ```bash
//! # The daily run
//! curator
//!
//! # Look back further and allow more papers
//! curator run --past-days 14 --max-papers 10
//!
//! # Rebuild the interest profile from current ratings
//! curator preference
//!
//! # Render the last run's papers for the static page
//! curator export --markdown docs/index.md --json docs/papers.json
//!
//! # Fill in abstracts and links missing from the collection
//! curator backfill
//! ```
//!
//! Credentials are read from `NOTION_API_TOKEN`, `NOTION_DB_ID` and `OPENAI_API_KEY`. Use `-v`
//! (repeatable) for more logging.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::path::PathBuf;

use clap::{builder::ArgAction, Args, Parser, Subcommand};
use console::style;
use curator::{error::CuratorError, paper::ScoredPaper, Config};
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

pub mod commands;
pub mod error;
pub mod interaction;

use crate::{commands::*, error::*, interaction::*};

/// Command line interface configuration and argument parsing
#[derive(Parser)]
#[command(author, version, about = "Keeps a Notion paper collection topped up from arXiv")]
pub struct Cli {
  /// Verbose mode (-v, -vv, -vvv) for different levels of logging detail
  #[arg(short, long, action = ArgAction::Count, global = true, help = "Increase logging verbosity")]
  verbose: u8,

  /// Path to the configuration file. Defaults to `~/.curator/config.toml`; a missing file means
  /// built-in defaults.
  #[arg(long, short, global = true)]
  config: Option<PathBuf>,

  /// Skip all prompts and accept defaults (mostly for testing)
  #[arg(long, hide = true, global = true)]
  accept_defaults: bool,

  /// The subcommand to execute
  #[command(subcommand)]
  command: Option<Commands>,
}

/// Configures the logging system based on the verbosity level
///
/// The verbosity levels are:
/// - 0: error (default)
/// - 1: warn
/// - 2: info
/// - 3: debug
/// - 4+: trace
///
/// `RUST_LOG` takes precedence when set.
fn setup_logging(verbosity: u8) {
  let filter = match verbosity {
    0 => "error",
    1 => "warn",
    2 => "info",
    3 => "debug",
    _ => "trace",
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_file(true)
    .with_line_number(true)
    .with_target(true)
    .init();
}

/// Entry point for the curator CLI
///
/// # Errors
///
/// Returns [`CuratordError`] for missing credentials, failed external calls, unreadable
/// configuration or state, and prompt failures.
#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  setup_logging(cli.verbose);

  let config_path = match &cli.config {
    Some(path) => path.clone(),
    None => Config::default_path()?,
  };
  debug!("Loading configuration from {}", config_path.display());
  let config = Config::load(&config_path)?;
  trace!("Configuration: {config:?}");

  let interaction = Terminal::new(cli.accept_defaults);
  let command = cli.command.unwrap_or_else(|| Commands::Run(RunArgs::default()));

  let result = match command {
    Commands::Run(args) => run(&interaction, &config, args).await.map(|_| ()),
    Commands::Preference => preference(&interaction, &config).await.map(|_| ()),
    Commands::Export(args) => export(&interaction, &config, args).map(|_| ()),
    Commands::Backfill(args) => backfill(&interaction, &config, args).await,
  };

  if let Err(e) = &result {
    eprintln!("{} {e}", style(ERROR_PREFIX).red());
  }
  result
}

//! Error type for the `curator` binary.

use std::path::PathBuf;

use thiserror::Error;

use super::*;

/// Result alias for the CLI.
pub type Result<T> = core::result::Result<T, CuratordError>;

/// Errors surfaced by CLI commands.
#[derive(Error, Debug)]
pub enum CuratordError {
  /// Anything raised by the library.
  #[error(transparent)]
  Curator(#[from] CuratorError),

  /// Terminal or file I/O failed.
  #[error(transparent)]
  Io(#[from] std::io::Error),

  /// An interactive prompt failed.
  #[error(transparent)]
  Dialog(#[from] dialoguer::Error),

  /// `run --ingest-only` was asked for but no preference is cached.
  #[error("No cached preference in {}; run `curator preference` first", .0.display())]
  MissingPreference(PathBuf),
}

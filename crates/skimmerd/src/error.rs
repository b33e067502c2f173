//! Error types for the skimmer CLI.

use thiserror::Error;

/// Error type alias used for the CLI crate.
pub type Result<T> = core::result::Result<T, SkimmerdError>;

/// Errors that can occur while running CLI commands.
///
/// Most of these are thin wrappers: the CLI's own failure modes are limited
/// to terminal interaction and file output, everything else bubbles up from
/// the `skimmer` library.
#[derive(Error, Debug)]
pub enum SkimmerdError {
  /// A library operation failed.
  #[error(transparent)]
  Skimmer(#[from] skimmer::error::SkimmerError),

  /// A file system operation failed (e.g. writing a CSV export).
  #[error(transparent)]
  Io(#[from] std::io::Error),

  /// A terminal prompt failed.
  #[error(transparent)]
  Interact(#[from] dialoguer::Error),
}

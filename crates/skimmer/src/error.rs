//! Error types for the skimmer library.
//!
//! This module provides a single error type covering every failure mode in
//! the paper pipeline:
//! - Network and provider API errors
//! - Record store operations
//! - PDF retrieval and text extraction
//! - Language-model calls and summary validation
//!
//! The summarizer deliberately distinguishes three catchable conditions —
//! an upstream call failure ([`SkimmerError::Llm`]), a response that is not
//! valid JSON ([`SkimmerError::SummaryParse`]), and a response that parses
//! but does not match the ten-field schema ([`SkimmerError::SummarySchema`]).
//! The parse and schema variants carry the offending payload so it can be
//! shown to the user for debugging.

use std::path::PathBuf;

use thiserror::Error;

/// Error type alias used for the [`skimmer`](crate) crate.
pub type Result<T> = core::result::Result<T, SkimmerError>;

/// Errors that can occur while searching, retrieving, or summarizing papers.
///
/// Every variant is recoverable per paper: the pipeline catches them at its
/// boundary and moves on to the next paper. Only a failure to open the
/// record store at startup is treated as fatal, and that decision belongs to
/// the caller.
#[derive(Error, Debug)]
pub enum SkimmerError {
  /// The stored source string doesn't match any known variant.
  ///
  /// This typically occurs when reading records back from the store and the
  /// stored source column has been tampered with. The string parameter
  /// contains the invalid source value for debugging.
  #[error("Invalid source type, see `skimmer::paper::PaperSource`")]
  InvalidSource(String),

  /// A network request failed.
  ///
  /// This can occur when:
  /// - The network is unavailable
  /// - The server is unreachable
  /// - The request times out
  /// - TLS/SSL errors occur
  #[error(transparent)]
  Network(#[from] reqwest::Error),

  /// A metadata provider returned an error response.
  ///
  /// This occurs when a search API (arXiv, Semantic Scholar) returns a
  /// non-success status, commonly a rate-limit rejection. One provider
  /// failing must not block the other; the pipeline downgrades this to a
  /// warning and continues with whatever succeeded.
  #[error("API error: {0}")]
  Api(String),

  /// A SQLite operation failed.
  ///
  /// This wraps errors from the `rusqlite` crate, covering:
  /// - SQL syntax errors
  /// - Constraint violations
  /// - Type conversion errors
  #[error(transparent)]
  Sqlite(#[from] rusqlite::Error),

  /// An async SQLite operation failed.
  ///
  /// This wraps errors from the `tokio-rusqlite` crate, covering
  /// async-specific failures in record store operations.
  #[error(transparent)]
  AsyncSqlite(#[from] tokio_rusqlite::Error),

  /// A file system operation failed.
  #[error(transparent)]
  Path(#[from] std::io::Error),

  /// JSON serialization or deserialization failed outside the summary
  /// validation path (e.g. writing the keywords column).
  #[error(transparent)]
  Json(#[from] serde_json::Error),

  /// PDF parsing and processing errors from the lopdf library.
  ///
  /// Common cases include malformed or corrupted PDF files, invalid stream
  /// encoding, and encrypted documents.
  #[error(transparent)]
  Pdf(#[from] lopdf::Error),

  /// The path handed to the text extractor does not exist.
  ///
  /// Kept distinct from [`SkimmerError::Path`] so callers can tell "the
  /// download never happened" apart from a generic I/O failure.
  #[error("No PDF exists at {0:?}")]
  PdfNotFound(PathBuf),

  /// The language-model call itself failed.
  ///
  /// Covers transport failures surfaced by the API (rate limits, auth,
  /// server errors) and responses whose envelope cannot be read at all.
  #[error("LLM request failed: {0}")]
  Llm(String),

  /// The model's response was not valid JSON, even after stripping any
  /// Markdown code fence.
  #[error("summary response is not valid JSON: {source}")]
  SummaryParse {
    /// The underlying JSON error.
    #[source]
    source:  serde_json::Error,
    /// The cleaned response text that failed to parse, for display.
    payload: String,
  },

  /// The model's response parsed as JSON but did not match the fixed
  /// ten-field summary schema (missing keys or wrong value shapes).
  #[error("summary response failed schema validation: {message}")]
  SummarySchema {
    /// What the validator rejected.
    message: String,
    /// The offending payload, for display.
    payload: String,
  },

  /// A configuration value was missing or invalid.
  #[error("{0}")]
  Config(String),
}

//! Academic paper search, retrieval, and structured summarization.
//!
//! `skimmer` turns a keyword into a shelf of summarized papers. It provides:
//!
//! - Keyword search across multiple metadata providers
//! - Open-access PDF download
//! - Text extraction and cleaning tuned for academic PDFs
//! - A fixed ten-field structured summary produced by a language model
//! - A local SQLite record store tracking each paper's progress
//!
//! # Pipeline
//!
//! Every paper moves through the same strictly ordered stage sequence, and
//! the record store is updated after each stage so partial progress survives
//! a later failure:
//!
//! ```text
//! search -> persist stub -> download PDF -> extract text -> summarize -> persist summary
//! ```
//!
//! A failure in any stage aborts only that paper; the batch continues.
//!
//! # Getting Started
//!
//! ```no_run
//! use skimmer::{
//!   database::Database,
//!   pipeline::Pipeline,
//!   summary::{LlmConfig, Summarizer},
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!   // Open or create the record store
//!   let db = Database::open(Database::default_path()).await?;
//!
//!   // Search both providers and persist stub records
//!   let pipeline = Pipeline::new(&db);
//!   let found = pipeline.search("sparse attention", 5).await;
//!   let stubs = pipeline.persist_stubs("sparse attention", &found.candidates).await?;
//!
//!   // Drive every candidate through download, extraction, and summarization
//!   let summarizer = Summarizer::new(LlmConfig::from_env()?);
//!   let outcomes = pipeline.process_batch(&summarizer, &stubs).await;
//!   println!("processed {} papers", outcomes.len());
//!
//!   Ok(())
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`paper`]: Record and candidate-metadata types
//! - [`search`]: Metadata search adapters (arXiv, Semantic Scholar)
//! - [`download`]: PDF retrieval
//! - [`extract`]: PDF text extraction and cleaning
//! - [`summary`]: Prompting, response validation, and summary persistence
//! - [`database`]: The SQLite record store
//! - [`pipeline`]: The per-paper stage orchestrator
//! - [`export`]: CSV exports of records and summaries
//!
//! # Design Philosophy
//!
//! - One paper at a time: processing is sequential and blocking at the I/O
//!   boundaries, trading throughput for predictable resource usage
//! - Recoverable failures are values, fatal ones are errors
//! - Every stage transition is committed to the store before the next begins

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::{
  fmt::Display,
  path::{Path, PathBuf},
  str::FromStr,
};

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
#[cfg(test)]
use {tempfile::tempdir, tracing_test::traced_test};

pub mod database;
pub mod download;
pub mod error;
pub mod export;
pub mod extract;
pub mod format;
pub mod paper;
pub mod pipeline;
pub mod search;
pub mod summary;

use crate::{error::*, paper::*};

/// Common traits and types for ergonomic imports.
///
/// # Usage
///
/// ```no_run
/// use skimmer::{database::Database, prelude::*};
///
/// async fn example() -> Result<(), SkimmerError> {
///   let db = Database::open(Database::default_path()).await?;
///   Ok(())
/// }
/// ```
///
/// # Contents
///
/// Currently exports:
/// - [`SearchAdapter`]: Trait implemented by every metadata provider
/// - [`SkimmerError`]: Core error type for the library
pub mod prelude {
  pub use crate::{error::SkimmerError, search::SearchAdapter};
}

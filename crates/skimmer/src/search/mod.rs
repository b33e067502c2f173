//! Metadata search adapters.
//!
//! Each adapter normalizes one provider's keyword-search endpoint into the
//! common [`PaperMeta`] candidate shape. Adapters share two rules:
//!
//! - A candidate is included only if an open-access PDF URL is resolvable;
//!   results without one are silently dropped.
//! - Author lists are flattened to a comma-joined display string.
//!
//! Adapters are **optional** collaborators: a provider failing (quota, HTTP
//! error) surfaces as an error from that adapter alone, and the pipeline
//! proceeds with whatever the other providers returned.

use async_trait::async_trait;

use super::*;

mod arxiv;
mod semantic_scholar;

pub use arxiv::ArxivSearch;
pub use semantic_scholar::SemanticScholarSearch;

/// Trait for provider-specific keyword search.
///
/// # Examples
///
/// ```no_run
/// use skimmer::{prelude::*, search::ArxivSearch};
///
/// # async fn example() -> Result<(), SkimmerError> {
/// let adapter = ArxivSearch::new();
/// let candidates = adapter.search("quantum error correction", 5).await?;
/// for paper in candidates {
///   println!("{} ({})", paper.title, paper.year);
/// }
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait SearchAdapter: Send + Sync {
  /// Searches the provider for `keyword`, returning at most `limit`
  /// candidates that have a resolvable open-access PDF URL.
  async fn search(&self, keyword: &str, limit: usize) -> Result<Vec<PaperMeta>>;

  /// Human-readable provider name, used in warnings when the provider is
  /// skipped.
  fn provider(&self) -> &'static str;
}

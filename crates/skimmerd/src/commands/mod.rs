use super::*;

pub mod export;
pub mod list;
pub mod search;
pub mod show;
pub mod upload;

pub use export::{export, ExportKind, ExportOptions};
pub use list::list;
pub use search::{search, SearchOptions};
pub use show::{show, ShowOptions};
pub use upload::{upload, UploadOptions};

/// Available commands for the CLI
#[derive(Subcommand, Clone)]
pub enum Commands {
  /// Search both providers for a keyword and persist the candidates
  Search(SearchOptions),

  /// Summarize PDF files you already have
  Upload(UploadOptions),

  /// List every saved paper record, most recent search first
  List,

  /// Show one record in full, summary included
  Show(ShowOptions),

  /// Write a CSV export of the record or summary tables
  Export(ExportOptions),
}

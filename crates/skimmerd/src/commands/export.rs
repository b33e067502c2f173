//! Module for tabular CSV exports.

use skimmer::export::{papers_csv, summaries_csv};

use super::*;

/// Which table to export.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ExportKind {
  /// One row per saved record
  Papers,
  /// One row per summarized record, ten summary fields included
  Summaries,
}

#[derive(Args, Clone)]
pub struct ExportOptions {
  /// Which table to export
  #[arg(value_enum)]
  pub kind: ExportKind,

  /// Where to write the CSV (defaults to papers.csv / summaries.csv)
  #[arg(long, short)]
  pub output: Option<PathBuf>,
}

/// Function for the [`Commands::Export`] subcommand.
pub async fn export<I: UserInteraction>(
  interaction: &I,
  db: &Database,
  options: ExportOptions,
) -> Result<()> {
  let records = db.fetch_all().await?;

  let (csv, default_name) = match options.kind {
    ExportKind::Papers => (papers_csv(&records), "papers.csv"),
    ExportKind::Summaries => (summaries_csv(&records), "summaries.csv"),
  };

  let path = options.output.unwrap_or_else(|| PathBuf::from(default_name));
  let rows = csv.lines().count().saturating_sub(1);
  std::fs::write(&path, csv)?;

  interaction
    .reply(ResponseContent::Success(&format!("Wrote {rows} row(s) to {}", path.display())))
}

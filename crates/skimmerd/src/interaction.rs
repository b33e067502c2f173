//! Terminal output and prompting.
//!
//! The display layer is deliberately thin: commands hand structured content
//! to a [`UserInteraction`] and never print directly, so the rendering can
//! change (or be swapped out in tests) without touching command logic.

use console::style;
use dialoguer::Confirm;
use skimmer::{
  error::SkimmerError,
  paper::{PaperMeta, PaperRecord},
  pipeline::PaperOutcome,
};

use super::*;

/// Prefix for information messages
pub static INFO_PREFIX: &str = "ℹ ";
/// Prefix for success messages
pub static SUCCESS_PREFIX: &str = "✓ ";
/// Prefix for warning messages
pub static WARNING_PREFIX: &str = "! ";
/// Prefix for error messages
pub static ERROR_PREFIX: &str = "✗ ";
/// Branch character for itemized output
pub static ITEM_PREFIX: &str = "├─";
/// Leaf character for itemized output (end of branch)
pub static LAST_ITEM_PREFIX: &str = "└─";

/// Structured content a command can hand to the display layer.
#[derive(Debug)]
pub enum ResponseContent<'a> {
  /// Search candidates, shown before the batch trigger
  Candidates(&'a [PaperMeta]),
  /// Saved records in list form
  Records(&'a [PaperRecord]),
  /// One record in full, summary included
  Detail(&'a PaperRecord),
  /// Per-paper outcomes of a batch run
  Outcomes(&'a [PaperOutcome]),
  /// A success message
  Success(&'a str),
  /// A non-fatal warning
  Warning(&'a str),
  /// An error message
  Error(&'a str),
  /// A neutral informational message
  Info(&'a str),
}

/// The interface commands talk to the user through.
pub trait UserInteraction {
  /// Asks a yes/no question, with `default` used when prompts are skipped.
  fn confirm(&self, message: &str, default: bool) -> Result<bool>;
  /// Renders one piece of structured content.
  fn reply(&self, content: ResponseContent) -> Result<()>;
}

/// Console-backed implementation of [`UserInteraction`].
pub struct ConsoleInteraction {
  /// When set, prompts are skipped and their defaults returned.
  accept_defaults: bool,
}

impl ConsoleInteraction {
  /// Creates a console interaction handler.
  pub fn new(accept_defaults: bool) -> Self { Self { accept_defaults } }
}

impl UserInteraction for ConsoleInteraction {
  fn confirm(&self, message: &str, default: bool) -> Result<bool> {
    if self.accept_defaults {
      return Ok(default);
    }
    Ok(Confirm::new().with_prompt(message).default(default).interact()?)
  }

  fn reply(&self, content: ResponseContent) -> Result<()> {
    match content {
      ResponseContent::Candidates(candidates) => render_candidates(candidates),
      ResponseContent::Records(records) => render_records(records),
      ResponseContent::Detail(record) => render_detail(record),
      ResponseContent::Outcomes(outcomes) => render_outcomes(outcomes),
      ResponseContent::Success(message) =>
        println!("{} {message}", style(SUCCESS_PREFIX).green()),
      ResponseContent::Warning(message) =>
        println!("{} {message}", style(WARNING_PREFIX).yellow()),
      ResponseContent::Error(message) => println!("{} {message}", style(ERROR_PREFIX).red()),
      ResponseContent::Info(message) => println!("{} {message}", style(INFO_PREFIX).cyan()),
    }
    Ok(())
  }
}

/// Renders the candidate list a search produced.
fn render_candidates(candidates: &[PaperMeta]) {
  println!(
    "{} {} paper(s) with a retrievable PDF:",
    style(INFO_PREFIX).cyan(),
    style(candidates.len()).bold()
  );
  for (index, paper) in candidates.iter().enumerate() {
    let prefix = if index + 1 == candidates.len() { LAST_ITEM_PREFIX } else { ITEM_PREFIX };
    println!("{prefix} {}", style(&paper.title).bold());
    println!("   {} / {} / {}", paper.authors, paper.year, paper.venue);
    println!("   {}", style(&paper.pdf_url).dim());
  }
}

/// Renders the saved-record listing.
fn render_records(records: &[PaperRecord]) {
  for record in records {
    let flags = format!(
      "{}{}",
      if record.downloaded { "D" } else { "-" },
      if record.summarized { "S" } else { "-" }
    );
    println!(
      "{} [{flags}] {} ({}, {})",
      style(&record.id).cyan(),
      record.title,
      record.year,
      record.source
    );
  }
}

/// Renders one record in full, labels matching the summary language.
fn render_detail(record: &PaperRecord) {
  println!("{}", style(&record.title).bold());
  println!("  id: {}", record.id);
  println!("  著者: {}", record.authors);
  println!("  年: {} / ソース: {}", record.year, record.source);
  if !record.url.is_empty() {
    println!("  URL: {}", record.url);
  }
  println!("  downloaded: {} / summarized: {}", record.downloaded, record.summarized);

  let summary = &record.summary;
  for (label, value) in [
    ("背景", &summary.background),
    ("目的", &summary.purpose),
    ("新規性", &summary.novelty),
    ("方法", &summary.method),
    ("結果", &summary.results),
    ("考察", &summary.discussion),
    ("懸念点", &summary.concerns),
    ("結論", &summary.conclusion),
    ("今後の展望", &summary.future_work),
  ] {
    println!("  {}: {value}", style(label).bold());
  }
  println!("  {}: {}", style("キーワード").bold(), summary.keywords.join(", "));
}

/// Renders per-paper batch outcomes, payload diagnostics included.
fn render_outcomes(outcomes: &[PaperOutcome]) {
  for outcome in outcomes {
    match outcome {
      PaperOutcome::Summarized { id, title } => {
        println!("{} {title} summarized (id {id})", style(SUCCESS_PREFIX).green());
      },
      PaperOutcome::PdfUnavailable { title, .. } => {
        println!(
          "{} Could not fetch the PDF for {title}. Download it manually and run `skimmer upload`.",
          style(WARNING_PREFIX).yellow()
        );
      },
      PaperOutcome::Failed { title, error, .. } => {
        println!("{} {title} failed: {error}", style(ERROR_PREFIX).red());
        // show the offending payload so a bad model reply can be debugged
        match error {
          SkimmerError::SummaryParse { payload, .. }
          | SkimmerError::SummarySchema { payload, .. } => {
            println!("   offending payload: {}", style(payload).dim());
          },
          _ => {},
        }
      },
    }
  }
}

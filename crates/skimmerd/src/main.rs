//! Command line interface for the skimmer paper summarization system.
//!
//! This crate provides the user-facing surface over the `skimmer` library:
//! - Keyword search across arXiv and Semantic Scholar
//! - The batch download-and-summarize trigger
//! - Multi-file PDF upload
//! - Record listing, detail lookup by id, and CSV export
//!
//! # Usage
//!
//! ```bash
//! # Search both providers, persist candidates, and decide interactively
//! skimmer search "sparse attention"
//!
//! # Search and summarize everything without asking
//! skimmer search "sparse attention" --limit 3 --summarize
//!
//! # Summarize PDFs you already have
//! skimmer upload a.pdf b.pdf
//!
//! # Browse the record store
//! skimmer list
//! skimmer show 'arXiv:2301.07041'
//! skimmer export summaries
//! ```
//!
//! Per-paper failures are printed as warnings with the paper's title and
//! processing continues; the only fatal startup condition is a record store
//! that cannot be opened. Verbosity is raised with repeated `-v` flags.

#![warn(missing_docs, clippy::missing_docs_in_private_items)]

use std::path::PathBuf;

use clap::{builder::ArgAction, Args, Parser, Subcommand, ValueEnum};
use skimmer::{
  database::Database,
  pipeline::Pipeline,
  summary::{LlmConfig, Summarizer},
};
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

pub mod commands;
pub mod error;
pub mod interaction;

use crate::{commands::*, error::*, interaction::*};

/// Command line interface configuration and argument parsing
#[derive(Parser)]
#[command(author, version, about = "Search, collect, and summarize academic papers")]
pub struct Cli {
  /// Verbose mode (-v, -vv, -vvv) for different levels of logging detail
  #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase logging verbosity"
    )]
  verbose: u8,

  /// The subcommand to execute
  #[command(subcommand)]
  command: Commands,

  /// Skip all prompts and accept defaults (mostly for testing)
  #[arg(long, hide = true, global = true)]
  accept_defaults: bool,
}

/// Configures the logging system based on the verbosity level
///
/// # Arguments
///
/// * `verbosity` - Number of times the verbose flag was used (0-3)
///
/// The verbosity levels are:
/// - 0: error (default)
/// - 1: warn
/// - 2: info
/// - 3: debug
/// - 4+: trace
fn setup_logging(verbosity: u8) {
  let filter = match verbosity {
    0 => "error",
    1 => "warn",
    2 => "info",
    3 => "debug",
    _ => "trace",
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}

/// Entry point for the skimmer CLI application
///
/// Parses arguments, sets up logging, opens the record store, and executes
/// the requested command. Opening the record store is the only operation
/// whose failure aborts the whole run; every later failure is reported per
/// paper and processing continues.
#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  setup_logging(cli.verbose);

  let interaction = ConsoleInteraction::new(cli.accept_defaults);

  let db = match Database::open(Database::default_path()).await {
    Ok(db) => db,
    Err(e) => {
      interaction.reply(ResponseContent::Error(&format!("Failed to open the record store: {e}")))?;
      std::process::exit(1);
    },
  };
  trace!("Using record store at: {}", Database::default_path().display());

  match cli.command {
    Commands::Search(options) => search(&interaction, &db, options).await,
    Commands::Upload(options) => upload(&interaction, &db, options).await,
    Commands::List => list(&interaction, &db).await,
    Commands::Show(options) => show(&interaction, &db, options).await,
    Commands::Export(options) => export(&interaction, &db, options).await,
  }
}

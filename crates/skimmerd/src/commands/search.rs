//! Module for the keyword-search entry point, including the batch
//! download-and-summarize trigger.

use super::*;

#[derive(Args, Clone)]
pub struct SearchOptions {
  /// Keyword to search for
  pub keyword: String,

  /// Results fetched per provider (applies to each provider independently)
  #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(1..=10))]
  pub limit: u8,

  /// Download and summarize every candidate without asking
  #[arg(long)]
  pub summarize: bool,
}

/// Function for the [`Commands::Search`] subcommand.
///
/// Runs both providers (one failing only produces a warning), persists a
/// stub record per candidate, and optionally drives the whole batch through
/// the pipeline. The language-model credential is only required once the
/// batch actually runs.
pub async fn search<I: UserInteraction>(
  interaction: &I,
  db: &Database,
  options: SearchOptions,
) -> Result<()> {
  let SearchOptions { keyword, limit, summarize } = options;

  interaction.reply(ResponseContent::Info(&format!("Searching for: {keyword}")))?;

  let pipeline = Pipeline::new(db);
  let found = pipeline.search(&keyword, limit as usize).await;
  for warning in &found.warnings {
    interaction.reply(ResponseContent::Warning(warning))?;
  }

  if found.candidates.is_empty() {
    return interaction.reply(ResponseContent::Info("No papers with a retrievable PDF were found"));
  }

  let stubs = pipeline.persist_stubs(&keyword, &found.candidates).await?;
  debug!("Persisted {} stub record(s)", stubs.len());
  interaction.reply(ResponseContent::Candidates(&found.candidates))?;

  let proceed =
    summarize || interaction.confirm("Download and summarize all of these now?", false)?;
  if !proceed {
    return interaction.reply(ResponseContent::Info(
      "Candidates saved. Re-run with --summarize, or summarize later from the saved records.",
    ));
  }

  let summarizer = Summarizer::new(LlmConfig::from_env()?);
  let outcomes = pipeline.process_batch(&summarizer, &stubs).await;
  interaction.reply(ResponseContent::Outcomes(&outcomes))?;

  interaction.reply(ResponseContent::Info(
    "Inspect results with `skimmer show <id>` or `skimmer export summaries`.",
  ))
}

//! Module for the multi-file PDF upload entry point.

use super::*;

#[derive(Args, Clone)]
pub struct UploadOptions {
  /// PDF files to extract and summarize
  #[arg(required = true)]
  pub files: Vec<PathBuf>,
}

/// Function for the [`Commands::Upload`] subcommand.
///
/// Each file is processed independently: a file that cannot be read,
/// extracted, or summarized is reported with its name and the rest of the
/// batch continues.
pub async fn upload<I: UserInteraction>(
  interaction: &I,
  db: &Database,
  options: UploadOptions,
) -> Result<()> {
  let summarizer = Summarizer::new(LlmConfig::from_env()?);
  let pipeline = Pipeline::new(db);

  for file in &options.files {
    let name = file
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_else(|| file.display().to_string());

    let bytes = match tokio::fs::read(file).await {
      Ok(bytes) => bytes,
      Err(e) => {
        interaction.reply(ResponseContent::Error(&format!("Could not read {name}: {e}")))?;
        continue;
      },
    };

    interaction.reply(ResponseContent::Info(&format!("Summarizing {name}...")))?;
    match pipeline.ingest_upload(&summarizer, &name, &bytes).await {
      Ok(record) => {
        interaction.reply(ResponseContent::Success(&format!(
          "{name} summarized (id {})",
          record.id
        )))?;
      },
      Err(e) => {
        interaction.reply(ResponseContent::Error(&format!("Failed to summarize {name}: {e}")))?;
      },
    }
  }

  Ok(())
}

//! Module for listing the saved paper records.

use super::*;

/// Function for the [`Commands::List`] subcommand.
pub async fn list<I: UserInteraction>(interaction: &I, db: &Database) -> Result<()> {
  let records = db.fetch_all().await?;

  if records.is_empty() {
    interaction.reply(ResponseContent::Info("No papers recorded yet. Try `skimmer search`."))
  } else {
    interaction.reply(ResponseContent::Records(&records))
  }
}

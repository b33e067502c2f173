//! Module for the record-detail lookup by id.

use super::*;

#[derive(Args, Clone)]
pub struct ShowOptions {
  /// Record id, as printed by `skimmer list` (e.g. "arXiv:2301.07041")
  pub id: String,
}

/// Function for the [`Commands::Show`] subcommand.
pub async fn show<I: UserInteraction>(
  interaction: &I,
  db: &Database,
  options: ShowOptions,
) -> Result<()> {
  match db.get(&options.id).await? {
    Some(record) => interaction.reply(ResponseContent::Detail(&record)),
    None => interaction
      .reply(ResponseContent::Warning(&format!("No record with id {:?}", options.id))),
  }
}

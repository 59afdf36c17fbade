//! Maintenance sweep over the collection.

use curator::maintenance::{fill_missing_abstracts, fill_missing_details};

use super::*;

/// Arguments that can be used for the [`Commands::Backfill`]
#[derive(Args, Clone, Default)]
pub struct BackfillArgs {
  /// Only fill abstracts, leaving links alone
  #[arg(long)]
  pub abstracts_only: bool,
}

/// Function for the [`Commands::Backfill`] in the CLI.
pub async fn backfill<I: UserInteraction>(
  interaction: &I,
  config: &Config,
  args: BackfillArgs,
) -> Result<()> {
  let services = Services::from_env(config)?;
  if !interaction
    .confirm("This looks up every incomplete entry on arXiv and edits it in Notion. Continue?")?
  {
    interaction.reply(ResponseContent::Info("Operation cancelled"))?;
    return Ok(());
  }

  let report = if args.abstracts_only {
    fill_missing_abstracts(&services.store, &services.feed).await?
  } else {
    fill_missing_details(&services.store, &services.feed).await?
  };

  interaction.reply(ResponseContent::Success(&format!(
    "Scanned {} entries, updated {}",
    report.scanned, report.updated
  )))?;
  if report.not_found > 0 {
    interaction.reply(ResponseContent::Info(&format!(
      "{} entries had no usable arXiv match",
      report.not_found
    )))?;
  }
  if report.exhausted > 0 {
    interaction.reply(ResponseContent::Warning(&format!(
      "{} lookups gave up after repeated network errors",
      report.exhausted
    )))?;
  }
  Ok(())
}

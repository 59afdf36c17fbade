//! The daily ingestion run.

use curator::pipeline::{IngestOptions, Ingestor};

use super::*;

/// Arguments that can be used for the [`Commands::Run`]
#[derive(Args, Clone, Default)]
pub struct RunArgs {
  /// Days to look back, overriding the configured default
  #[arg(long)]
  pub past_days: Option<u32>,

  /// Most papers to ask the model for, overriding the configured default
  #[arg(long)]
  pub max_papers: Option<usize>,

  /// Regenerate the preference even if one is cached
  #[arg(long, conflicts_with = "ingest_only")]
  pub refresh_preference: bool,

  /// Only ingest, using the cached preference
  #[arg(long)]
  pub ingest_only: bool,
}

/// Function for the [`Commands::Run`] in the CLI.
pub async fn run<I: UserInteraction>(
  interaction: &I,
  config: &Config,
  args: RunArgs,
) -> Result<Vec<ScoredPaper>> {
  let state = RunState::new(&config.state_dir);
  let cached = state.load_preference()?;
  if args.ingest_only && cached.is_none() {
    return Err(CuratordError::MissingPreference(state.preference_path()));
  }

  let services = Services::from_env(config)?;
  let preference = match cached {
    Some(stored) if !args.refresh_preference => {
      debug!("Using preference generated at {}", stored.generated_at);
      stored.preference
    },
    _ => preference::refresh(interaction, &services, config, &state).await?,
  };

  let mut options = IngestOptions::from_config(config);
  options.past_days = args.past_days.unwrap_or(options.past_days);
  options.max_papers = args.max_papers.unwrap_or(options.max_papers);

  interaction.reply(ResponseContent::Info(&format!(
    "Looking for up to {} papers from the past {} days",
    options.max_papers, options.past_days
  )))?;
  let mut ingestor =
    Ingestor::new(&services.feed, &services.scorer, &services.store, config.feed.categories.clone());
  let added = ingestor.run(&preference, &options).await?;

  state.save_new_papers(&added)?;
  interaction.reply(ResponseContent::Papers(&added))?;
  interaction.reply(ResponseContent::Success(&format!("Added {} papers", added.len())))?;
  Ok(added)
}

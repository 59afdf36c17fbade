//! Regenerating the cached interest profile.

use chrono::Utc;
use curator::{preference::PreferenceSynthesizer, state::StoredPreference};

use super::*;

/// Function for the [`Commands::Preference`] in the CLI.
pub async fn preference<I: UserInteraction>(interaction: &I, config: &Config) -> Result<String> {
  let services = Services::from_env(config)?;
  let state = RunState::new(&config.state_dir);
  let preference = refresh(interaction, &services, config, &state).await?;
  interaction.reply(ResponseContent::Text(&preference))?;
  Ok(preference)
}

/// Synthesizes a new preference and caches it.
pub(crate) async fn refresh<I: UserInteraction>(
  interaction: &I,
  services: &Services,
  config: &Config,
  state: &RunState,
) -> Result<String> {
  interaction.reply(ResponseContent::Info("Synthesizing preference from your ratings"))?;
  let preference = PreferenceSynthesizer::new(&services.store, &services.scorer)
    .synthesize(&config.interest_prefix)
    .await?;
  state.save_preference(&StoredPreference {
    preference:   preference.clone(),
    generated_at: Utc::now(),
  })?;
  interaction.reply(ResponseContent::Success(&format!(
    "Preference saved to {}",
    state.preference_path().display()
  )))?;
  Ok(preference)
}

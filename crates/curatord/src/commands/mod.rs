use curator::{
  feed::ArxivClient, llm::OpenAiClient, state::RunState, store::NotionClient, Credentials,
};

use super::*;

pub mod backfill;
pub mod export;
pub mod preference;
pub mod run;

pub use backfill::{backfill, BackfillArgs};
pub use export::{export, ExportArgs};
pub use preference::preference;
pub use run::{run, RunArgs};

/// Available commands for the CLI
#[derive(Subcommand, Clone)]
pub enum Commands {
  /// Ingest recent papers into the collection (default when no command is given)
  Run(RunArgs),

  /// Regenerate the interest profile from the collection's ratings
  Preference,

  /// Render the last run's papers as markdown and JSON
  Export(ExportArgs),

  /// Fill in abstracts and links missing from the collection
  Backfill(BackfillArgs),
}

/// Clients for the three external services.
pub struct Services {
  /// arXiv
  pub feed:   ArxivClient,
  /// Language model
  pub scorer: OpenAiClient,
  /// Notion collection
  pub store:  NotionClient,
}

impl Services {
  /// Builds every client, failing before any network call if a credential is missing.
  pub fn from_env(config: &Config) -> Result<Self> {
    let credentials = Credentials::from_env()?;
    trace!("Credentials: {credentials:?}");
    Ok(Self {
      feed:   ArxivClient::new(&config.feed)?,
      scorer: OpenAiClient::new(&config.llm, &credentials.openai_api_key),
      store:  NotionClient::new(&config.notion, &credentials),
    })
  }
}

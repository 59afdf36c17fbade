//! Rendering the last run for the static page.

use chrono::Utc;
use curator::export::{export_json, export_markdown};

use super::*;

/// Arguments that can be used for the [`Commands::Export`]
#[derive(Args, Clone, Default)]
pub struct ExportArgs {
  /// Markdown output, overriding the configured path
  #[arg(long)]
  pub markdown: Option<PathBuf>,

  /// JSON output, overriding the configured path
  #[arg(long)]
  pub json: Option<PathBuf>,
}

/// Function for the [`Commands::Export`] in the CLI. Needs no credentials.
pub fn export<I: UserInteraction>(
  interaction: &I,
  config: &Config,
  args: ExportArgs,
) -> Result<Vec<ScoredPaper>> {
  let state = RunState::new(&config.state_dir);
  let papers = state.load_new_papers()?;
  if papers.is_empty() {
    interaction.reply(ResponseContent::Warning("No papers from the last run"))?;
  }

  let markdown = args.markdown.unwrap_or_else(|| config.export.markdown_path.clone());
  let json = args.json.unwrap_or_else(|| config.export.json_path.clone());
  let generated_at = Utc::now();

  export_markdown(&papers, &markdown, generated_at)?;
  export_json(&papers, &json, generated_at)?;
  interaction.reply(ResponseContent::Success(&format!(
    "Exported {} papers to {} and {}",
    papers.len(),
    markdown.display(),
    json.display()
  )))?;
  Ok(papers)
}

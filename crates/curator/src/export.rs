//! Static rendering of the latest additions for a read-only web page.
//!
//! The generation time is always passed in, so rendering the same papers at the same instant
//! yields identical bytes.

use std::fmt::Write as _;

use super::*;

/// Timestamp format on the markdown page.
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Shape of the JSON export.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportDocument {
  /// Papers in run order
  pub papers:       Vec<ScoredPaper>,
  /// Generation time, RFC 3339
  pub last_updated: String,
  /// Number of papers
  pub count:        usize,
}

/// Renders the markdown page.
pub fn render_markdown(papers: &[ScoredPaper], generated_at: DateTime<Utc>) -> String {
  let mut page = format!(
    "# 📚 MyArxivSanity\n\n*Latest papers from arXiv based on your research \
     interests*\n\n<div class=\"stats\">\n<strong>Last Updated:</strong> {}<br>\n<strong>Total \
     Papers:</strong> {}\n</div>\n\n---\n\n",
    generated_at.format(DISPLAY_FORMAT),
    papers.len()
  );

  if papers.is_empty() {
    page.push_str(
      "\n<div class=\"no-papers\">\n<h2>No New Papers Found</h2>\n<p>Check back later for new \
       research papers!</p>\n</div>\n\n---\n\n*This page is automatically updated when new \
       papers are added to your collection.*\n",
    );
    return page;
  }

  for (i, paper) in papers.iter().enumerate() {
    let authors =
      if paper.authors.is_empty() { String::new() } else { format!("**Authors:** {}", paper.authors) };
    let link = paper
      .abs_url()
      .map(|url| format!("<a href=\"{url}\" class=\"arxiv-link\">📄 View on arXiv</a>"))
      .unwrap_or_default();
    let summary = if paper.summary.is_empty() { "No summary available." } else { &paper.summary };
    // Writing to a String cannot fail.
    let _ = write!(
      page,
      "\n## {}. {}\n\n<div class=\"paper-meta\">\n{authors}\n{link}\n</div>\n\n### \
       Abstract\n<div class=\"abstract\">\n{summary}\n</div>\n\n---\n\n",
      i + 1,
      paper.name
    );
  }
  page
}

/// Writes the markdown page to `path`, creating parent directories.
pub fn export_markdown(
  papers: &[ScoredPaper],
  path: &Path,
  generated_at: DateTime<Utc>,
) -> Result<()> {
  write_file(path, &render_markdown(papers, generated_at))?;
  info!("Exported {} papers to {}", papers.len(), path.display());
  Ok(())
}

/// Renders the JSON document.
pub fn render_json(papers: &[ScoredPaper], generated_at: DateTime<Utc>) -> Result<String> {
  let document = ExportDocument {
    papers:       papers.to_vec(),
    last_updated: generated_at.to_rfc3339(),
    count:        papers.len(),
  };
  Ok(serde_json::to_string_pretty(&document)?)
}

/// Writes the JSON document to `path`, creating parent directories.
pub fn export_json(papers: &[ScoredPaper], path: &Path, generated_at: DateTime<Utc>) -> Result<()> {
  write_file(path, &render_json(papers, generated_at)?)?;
  info!("Exported {} papers to {}", papers.len(), path.display());
  Ok(())
}

/// Overwrites `path` with `contents`.
fn write_file(path: &Path, contents: &str) -> Result<()> {
  if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(path, contents)?;
  Ok(())
}

//! Console output and confirmation prompts.

use dialoguer::Confirm;

use super::*;

/// Prefix for information messages
pub static INFO_PREFIX: &str = "ℹ ";
/// Prefix for success messages
pub static SUCCESS_PREFIX: &str = "✓ ";
/// Prefix for warning messages
pub static WARNING_PREFIX: &str = "⚠️ ";
/// Prefix for error messages
pub static ERROR_PREFIX: &str = "✗ ";
/// Branch character for paper details
pub static TREE_BRANCH: &str = "├─";
/// Leaf character for the last paper detail
pub static TREE_LEAF: &str = "└─";

/// Something worth telling the user.
#[derive(Debug)]
pub enum ResponseContent<'a> {
  /// Papers, numbered in order
  Papers(&'a [ScoredPaper]),
  /// A block of free text, such as a preference
  Text(&'a str),
  /// Completed step
  Success(&'a str),
  /// Progress or context
  Info(&'a str),
  /// Something odd but not fatal
  Warning(&'a str),
}

/// How commands talk to the user.
pub trait UserInteraction {
  /// Asks a yes/no question.
  fn confirm(&self, message: &str) -> Result<bool>;
  /// Shows some output.
  fn reply(&self, content: ResponseContent) -> Result<()>;
}

/// Interaction over stdout and the controlling terminal.
pub struct Terminal {
  /// Answer yes to every confirmation without asking
  accept_defaults: bool,
}

impl Terminal {
  /// Creates a terminal interaction.
  pub fn new(accept_defaults: bool) -> Self { Self { accept_defaults } }
}

impl UserInteraction for Terminal {
  fn confirm(&self, message: &str) -> Result<bool> {
    if self.accept_defaults {
      return Ok(true);
    }
    Ok(Confirm::new().with_prompt(message).default(false).interact()?)
  }

  fn reply(&self, content: ResponseContent) -> Result<()> {
    match content {
      ResponseContent::Papers(papers) =>
        if papers.is_empty() {
          println!("{} No new papers", style(INFO_PREFIX).cyan());
        } else {
          for (i, paper) in papers.iter().enumerate() {
            print_paper(i + 1, paper);
          }
        },
      ResponseContent::Text(text) => println!("{text}"),
      ResponseContent::Success(message) => println!("{} {message}", style(SUCCESS_PREFIX).green()),
      ResponseContent::Info(message) => println!("{} {message}", style(INFO_PREFIX).cyan()),
      ResponseContent::Warning(message) =>
        println!("{} {message}", style(WARNING_PREFIX).yellow()),
    }
    Ok(())
  }
}

/// One numbered paper with its authors and link.
fn print_paper(number: usize, paper: &ScoredPaper) {
  println!("{} {}", style(format!("{number}.")).dim(), style(&paper.name).white().bold());
  println!("   {} {}", style(TREE_BRANCH).dim(), style(&paper.authors).cyan());
  match paper.abs_url() {
    Some(url) => println!("   {} {}", style(TREE_LEAF).dim(), style(url).blue().underlined()),
    None => println!("   {} {}", style(TREE_LEAF).dim(), style("no arXiv link").dim()),
  }
}

//! Interest-profile synthesis from the owner's ratings.
//!
//! The bulk listing does not carry ratings, so every listed entry is retrieved once to read its
//! rating and abstract. Entries rated 4–5 are "liked", 1–2 "disliked"; unrated and 3-rated
//! entries are left out. The model's answer is returned verbatim.

use super::*;
use crate::store::Sentiment;

/// Builds a preference description for the next ingestion run.
pub struct PreferenceSynthesizer<'a> {
  /// Rated collection
  store:  &'a dyn DocumentStore,
  /// Model that writes the description
  scorer: &'a dyn ScoringGateway,
}

/// A rated paper as it appears in the preference prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatedPaper {
  /// Title
  pub name:          String,
  /// Abstract, empty when the entry has none
  pub abstract_text: String,
}

impl<'a> PreferenceSynthesizer<'a> {
  /// Creates a synthesizer over a store and a model.
  pub fn new(store: &'a dyn DocumentStore, scorer: &'a dyn ScoringGateway) -> Self {
    Self { store, scorer }
  }

  /// Reads the ratings and asks the model for a description of the owner's interests.
  ///
  /// `prefix` is the owner's own standing statement of interest, placed first in the prompt.
  pub async fn synthesize(&self, prefix: &str) -> Result<String> {
    let (liked, disliked) = self.partition().await?;
    info!("Synthesizing preference from {} liked and {} disliked papers", liked.len(), disliked.len());
    let prompt = build_preference_prompt(prefix, &liked, &disliked);
    self.scorer.complete_text(&prompt).await
  }

  /// Splits the collection into liked and disliked papers, in listing order.
  pub async fn partition(&self) -> Result<(Vec<RatedPaper>, Vec<RatedPaper>)> {
    let mut liked = Vec::new();
    let mut disliked = Vec::new();

    for listing in self.store.list().await? {
      let entry = self.store.retrieve(&listing.id).await?;
      let Some(rating) = entry.rating else {
        trace!("\"{}\" is unrated", entry.name);
        continue;
      };
      let paper =
        RatedPaper { name: entry.name, abstract_text: entry.abstract_text.unwrap_or_default() };
      match rating.sentiment() {
        Sentiment::Liked => liked.push(paper),
        Sentiment::Disliked => disliked.push(paper),
        Sentiment::Neutral => {},
      }
    }

    Ok((liked, disliked))
  }
}

/// Builds the synthesis prompt: prefix, liked papers, disliked papers, then the request.
pub fn build_preference_prompt(prefix: &str, liked: &[RatedPaper], disliked: &[RatedPaper]) -> String {
  format!(
    "This is my general research interest: {prefix}\n\nThis is a list of papers I like (names \
     and abstracts): {}\nThis is a list of papers I do not like (names and abstracts): {}\n(1) \
     Please return a description of user research interests. (2) Add also a list of tags and \
     keywords that best match the research interests based on the above papers the user liked \
     and disliked.\n",
    paper_lines(liked),
    paper_lines(disliked)
  )
}

/// `name: abstract` lines.
fn paper_lines(papers: &[RatedPaper]) -> String {
  papers
    .iter()
    .map(|paper| format!("{}: {}", paper.name, paper.abstract_text))
    .collect::<Vec<_>>()
    .join("\n")
}

//! In-memory doubles of the three collaborators.

use std::{
  collections::{HashMap, VecDeque},
  sync::Mutex,
};

use async_trait::async_trait;
use curator::{
  error::Result,
  feed::FeedWindow,
  llm::OutputSchema,
  store::{EntryPatch, NewEntry, StoreListing},
};
use serde_json::Value;

use super::*;

/// Feed serving a fixed candidate list and canned lookups.
#[derive(Default)]
pub struct MockFeed {
  pub candidates:   Vec<CandidatePaper>,
  pub lookups:      HashMap<String, Lookup>,
  pub fail_fetch:   bool,
  pub fetch_calls:  Mutex<Vec<(FeedWindow, Vec<String>, usize)>>,
  pub lookup_calls: Mutex<Vec<String>>,
}

impl MockFeed {
  pub fn with_candidates(candidates: Vec<CandidatePaper>) -> Self {
    Self { candidates, ..Default::default() }
  }

  pub fn with_lookup(mut self, title: &str, lookup: Lookup) -> Self {
    self.lookups.insert(title.to_string(), lookup);
    self
  }

  pub fn lookup_calls(&self) -> Vec<String> { self.lookup_calls.lock().unwrap().clone() }
}

#[async_trait]
impl FeedSource for MockFeed {
  async fn fetch_recent(
    &self,
    window: FeedWindow,
    categories: &[String],
    max_results: usize,
  ) -> Result<Vec<CandidatePaper>> {
    self.fetch_calls.lock().unwrap().push((window, categories.to_vec(), max_results));
    if self.fail_fetch {
      return Err(CuratorError::ApiError("feed unavailable".into()));
    }
    Ok(self.candidates.iter().take(max_results).cloned().collect())
  }

  async fn resolve_by_title(&self, title: &str) -> Lookup {
    self.lookup_calls.lock().unwrap().push(title.to_string());
    self.lookups.get(title).cloned().unwrap_or(Lookup::NotFound)
  }
}

/// Model replaying queued answers and recording every prompt.
#[derive(Default)]
pub struct MockScorer {
  pub texts:              Mutex<VecDeque<String>>,
  pub structured:         Mutex<VecDeque<Result<Value>>>,
  pub text_prompts:       Mutex<Vec<String>>,
  pub structured_prompts: Mutex<Vec<(String, String)>>,
}

impl MockScorer {
  pub fn new() -> Self { Self::default() }

  pub fn with_text(self, text: &str) -> Self {
    self.texts.lock().unwrap().push_back(text.to_string());
    self
  }

  pub fn with_structured(self, value: Result<Value>) -> Self {
    self.structured.lock().unwrap().push_back(value);
    self
  }

  pub fn text_prompts(&self) -> Vec<String> { self.text_prompts.lock().unwrap().clone() }

  pub fn structured_prompts(&self) -> Vec<(String, String)> {
    self.structured_prompts.lock().unwrap().clone()
  }
}

#[async_trait]
impl ScoringGateway for MockScorer {
  async fn complete_text(&self, prompt: &str) -> Result<String> {
    self.text_prompts.lock().unwrap().push(prompt.to_string());
    self
      .texts
      .lock()
      .unwrap()
      .pop_front()
      .ok_or_else(|| CuratorError::ApiError("no queued text completion".into()))
  }

  async fn complete_structured(
    &self,
    system: &str,
    prompt: &str,
    _schema: &OutputSchema,
  ) -> Result<Value> {
    self.structured_prompts.lock().unwrap().push((system.to_string(), prompt.to_string()));
    self
      .structured
      .lock()
      .unwrap()
      .pop_front()
      .unwrap_or_else(|| Err(CuratorError::ApiError("no queued structured completion".into())))
  }
}

/// Store keeping entries in memory and recording every call.
#[derive(Default)]
pub struct MockStore {
  pub entries:        Mutex<Vec<StoreEntry>>,
  pub created:        Mutex<Vec<NewEntry>>,
  pub retrieved:      Mutex<Vec<String>>,
  pub updates:        Mutex<Vec<(String, EntryPatch)>>,
  /// Zero-based index of the create call that fails
  pub fail_create_at: Option<usize>,
  pub fail_list:      bool,
}

impl MockStore {
  pub fn with_entries(entries: Vec<StoreEntry>) -> Self {
    Self { entries: Mutex::new(entries), ..Default::default() }
  }

  pub fn created(&self) -> Vec<NewEntry> { self.created.lock().unwrap().clone() }

  pub fn retrieved(&self) -> Vec<String> { self.retrieved.lock().unwrap().clone() }

  pub fn updates(&self) -> Vec<(String, EntryPatch)> { self.updates.lock().unwrap().clone() }
}

#[async_trait]
impl DocumentStore for MockStore {
  async fn list(&self) -> Result<Vec<StoreListing>> {
    if self.fail_list {
      return Err(CuratorError::ApiError("store unavailable".into()));
    }
    Ok(
      self
        .entries
        .lock()
        .unwrap()
        .iter()
        .map(|entry| StoreListing {
          id:           entry.id.clone(),
          name:         entry.name.clone(),
          url:          entry.url.clone(),
          has_abstract: entry.abstract_text.is_some(),
        })
        .collect(),
    )
  }

  async fn retrieve(&self, id: &str) -> Result<StoreEntry> {
    self.retrieved.lock().unwrap().push(id.to_string());
    self
      .entries
      .lock()
      .unwrap()
      .iter()
      .find(|entry| entry.id == id)
      .cloned()
      .ok_or(CuratorError::NotFound)
  }

  async fn create(&self, entry: &NewEntry) -> Result<String> {
    let mut created = self.created.lock().unwrap();
    if self.fail_create_at == Some(created.len()) {
      return Err(CuratorError::ApiError("create rejected".into()));
    }
    created.push(entry.clone());
    let id = format!("new-{}", created.len());
    self.entries.lock().unwrap().push(StoreEntry {
      id:            id.clone(),
      name:          entry.name.clone(),
      url:           entry.url.clone(),
      abstract_text: Some(entry.abstract_text.clone()),
      rating:        None,
    });
    Ok(id)
  }

  async fn update(&self, id: &str, patch: &EntryPatch) -> Result<()> {
    self.updates.lock().unwrap().push((id.to_string(), patch.clone()));
    let mut entries = self.entries.lock().unwrap();
    let entry = entries.iter_mut().find(|entry| entry.id == id).ok_or(CuratorError::NotFound)?;
    if let Some(url) = &patch.url {
      entry.url = Some(url.clone());
    }
    if let Some(text) = &patch.abstract_text {
      entry.abstract_text = Some(text.clone());
    }
    Ok(())
  }
}

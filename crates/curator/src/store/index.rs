use super::*;

/// Snapshot of the collection's names, taken once per run.
///
/// The snapshot is never refreshed: entries written later in the same run are not in it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionIndex {
  /// Display name to store id
  entries: HashMap<String, String>,
}

impl CollectionIndex {
  /// Lists the whole store once and indexes it by name.
  ///
  /// When two entries share a name the later one in listing order wins.
  pub async fn build(store: &dyn DocumentStore) -> Result<Self> {
    let index = Self::from_listings(store.list().await?);
    info!("Indexed {} existing entries", index.len());
    Ok(index)
  }

  /// Indexes an existing listing.
  pub fn from_listings(listings: impl IntoIterator<Item = StoreListing>) -> Self {
    Self { entries: listings.into_iter().map(|listing| (listing.name, listing.id)).collect() }
  }

  /// Whether an entry with exactly this name existed when the snapshot was taken.
  pub fn contains(&self, name: &str) -> bool { self.entries.contains_key(name) }

  /// Store id for a name.
  pub fn id_of(&self, name: &str) -> Option<&str> { self.entries.get(name).map(String::as_str) }

  /// Number of indexed names.
  pub fn len(&self) -> usize { self.entries.len() }

  /// Whether the snapshot is empty.
  pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

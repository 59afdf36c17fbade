//! Backfill sweeps over the stored collection.
//!
//! Both sweeps list the store once, look up each incomplete entry on arXiv by exact title and
//! patch only the fields that were empty. Running a sweep twice is harmless: complete entries
//! are never looked up again. Nothing guards against the entry being edited elsewhere between
//! the listing and the patch.

use super::*;
use crate::{
  feed::Lookup,
  store::{EntryPatch, StoreListing},
};

/// Counts from one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillReport {
  /// Entries listed
  pub scanned:   usize,
  /// Entries patched
  pub updated:   usize,
  /// Incomplete entries arXiv had nothing useful for
  pub not_found: usize,
  /// Incomplete entries whose lookup gave up on transport errors
  pub exhausted: usize,
}

/// Which fields a sweep may fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fields {
  /// Abstract only
  Abstract,
  /// Abstract and link
  AbstractAndUrl,
}

/// Fills empty abstracts from arXiv.
pub async fn fill_missing_abstracts(
  store: &dyn DocumentStore,
  feed: &dyn FeedSource,
) -> Result<BackfillReport> {
  sweep(store, feed, Fields::Abstract).await
}

/// Fills empty abstracts and links from arXiv, whichever of the two is missing.
pub async fn fill_missing_details(
  store: &dyn DocumentStore,
  feed: &dyn FeedSource,
) -> Result<BackfillReport> {
  sweep(store, feed, Fields::AbstractAndUrl).await
}

/// Shared sweep; entries are handled strictly one after another.
async fn sweep(
  store: &dyn DocumentStore,
  feed: &dyn FeedSource,
  fields: Fields,
) -> Result<BackfillReport> {
  let listings = store.list().await?;
  let mut report = BackfillReport { scanned: listings.len(), ..Default::default() };

  for listing in listings {
    let url_missing = fields == Fields::AbstractAndUrl && listing.url.is_none();
    if listing.has_abstract && !url_missing {
      continue;
    }

    debug!("Looking up \"{}\" on arXiv", listing.name);
    let resolved = match feed.resolve_by_title(&listing.name).await {
      Lookup::Found(resolved) => resolved,
      Lookup::NotFound => {
        info!("No arXiv match for \"{}\"", listing.name);
        report.not_found += 1;
        continue;
      },
      Lookup::Exhausted { attempts, last_error } => {
        warn!("Gave up on \"{}\" after {attempts} attempts: {last_error}", listing.name);
        report.exhausted += 1;
        continue;
      },
    };

    let patch = patch_for(&listing, url_missing, resolved);
    if patch.is_empty() {
      info!("arXiv match for \"{}\" had nothing to add", listing.name);
      report.not_found += 1;
      continue;
    }

    store.update(&listing.id, &patch).await?;
    info!("Updated \"{}\"", listing.name);
    report.updated += 1;
  }

  info!(
    "Backfill scanned {} entries: {} updated, {} not found, {} gave up",
    report.scanned, report.updated, report.not_found, report.exhausted
  );
  Ok(report)
}

/// The fields of `resolved` that fill gaps in `listing`.
fn patch_for(
  listing: &StoreListing,
  url_missing: bool,
  resolved: crate::feed::ResolvedPaper,
) -> EntryPatch {
  EntryPatch {
    url:           (url_missing && !resolved.url.is_empty()).then_some(resolved.url),
    abstract_text: (!listing.has_abstract && !resolved.abstract_text.is_empty())
      .then_some(resolved.abstract_text),
  }
}

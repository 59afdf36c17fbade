use std::collections::HashMap;

use curator::maintenance::{fill_missing_abstracts, fill_missing_details, BackfillReport};

use super::*;

fn resolved(id: &str, abstract_text: &str) -> Lookup {
  Lookup::Found(ResolvedPaper {
    abstract_text: abstract_text.to_string(),
    url:           format!("https://arxiv.org/abs/{id}"),
    arxiv_id:      id.to_string(),
  })
}

fn store() -> MockStore {
  let mut linked = entry("d", "Linked, no abstract", None, None);
  linked.url = Some("https://example.org/linked".to_string());
  MockStore::with_entries(vec![
    entry("a", "Complete", Some(5), Some("Has one")),
    entry("b", "Findable", None, None),
    entry("c", "Unknown", None, None),
    linked,
    entry("e", "Flaky", None, None),
  ])
}

fn feed() -> MockFeed {
  MockFeed::default()
    .with_lookup("Findable", resolved("2401.00001v1", "Found abstract."))
    .with_lookup("Linked, no abstract", resolved("2401.00002v1", "Linked abstract."))
    .with_lookup("Flaky", Lookup::Exhausted { attempts: 3, last_error: "timed out".into() })
}

#[traced_test]
#[tokio::test]
async fn test_fill_missing_abstracts() -> TestResult<()> {
  let (store, feed) = (store(), feed());

  let report = fill_missing_abstracts(&store, &feed).await?;
  assert_eq!(report, BackfillReport { scanned: 5, updated: 2, not_found: 1, exhausted: 1 });
  assert_eq!(feed.lookup_calls(), vec!["Findable", "Unknown", "Linked, no abstract", "Flaky"]);

  let updates = store.updates();
  assert_eq!(updates.len(), 2);
  assert_eq!(updates[0].0, "b");
  assert_eq!(updates[0].1.abstract_text.as_deref(), Some("Found abstract."));
  assert_eq!(updates[0].1.url, None);
  assert!(logs_contain("Gave up on \"Flaky\" after 3 attempts"));
  assert!(logs_contain("No arXiv match for \"Unknown\""));
  Ok(())
}

#[tokio::test]
async fn test_fill_missing_details_patches_only_empty_fields() -> TestResult<()> {
  let (store, feed) = (store(), feed());

  let report = fill_missing_details(&store, &feed).await?;
  assert_eq!(report.updated, 2);

  let updates: HashMap<String, _> = store.updates().into_iter().collect();
  let findable = &updates["b"];
  assert_eq!(findable.url.as_deref(), Some("https://arxiv.org/abs/2401.00001v1"));
  assert_eq!(findable.abstract_text.as_deref(), Some("Found abstract."));

  let linked = &updates["d"];
  assert_eq!(linked.url, None);
  assert_eq!(linked.abstract_text.as_deref(), Some("Linked abstract."));
  Ok(())
}

#[tokio::test]
async fn test_backfill_is_idempotent() -> TestResult<()> {
  let (store, feed) = (store(), feed());

  fill_missing_details(&store, &feed).await?;
  let before = store.updates().len();
  let second = fill_missing_details(&store, &feed).await?;

  assert_eq!(second.updated, 0);
  assert_eq!(store.updates().len(), before);
  Ok(())
}

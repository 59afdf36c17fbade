//! `ArxivClient` against a local fixture server standing in for the Atom API.

use std::{
  collections::HashMap,
  net::SocketAddr,
  sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
  },
  time::Duration,
};

use axum::{extract::Query, http::StatusCode, routing::get, Router};
use curator::{
  configuration::{FeedConfig, RetryPolicy},
  feed::{ArxivClient, FeedWindow},
};

use super::*;

const EMPTY_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query</title>
  <id>http://arxiv.org/api/empty</id>
</feed>"#;

const LISTING_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>http://arxiv.org/abs/2401.00003v1</id>
    <published>2024-01-19T10:00:00Z</published>
    <title>Newest</title>
    <summary>Newest summary.</summary>
    <author><name>Ada Lovelace</name></author>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2401.00002v1</id>
    <published>2024-01-18T10:00:00Z</published>
    <title>Middle</title>
    <summary>Middle summary.</summary>
    <author><name>Grace Hopper</name></author>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2312.00001v1</id>
    <published>2023-12-01T10:00:00Z</published>
    <title>Too Old</title>
    <summary>Old summary.</summary>
    <author><name>Someone</name></author>
  </entry>
</feed>"#;

const LOOKUP_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>http://arxiv.org/abs/2401.12345v2</id>
    <published>2024-01-10T10:00:00Z</published>
    <title>Sparse Attention</title>
    <summary>  We prune
      attention heads.  </summary>
    <author><name>Ada Lovelace</name></author>
  </entry>
</feed>"#;

/// Requests seen by the fixture.
#[derive(Clone, Default)]
struct Hits {
  count:   Arc<AtomicUsize>,
  queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

/// Serves `body` with `status` for every query and counts the requests.
async fn serve(status: StatusCode, body: &'static str) -> (ArxivClient, Hits) {
  serve_with(status, body, Duration::ZERO, 5).await
}

/// Like [`serve`], but holds each answer for `delay` against a client that gives up after
/// `timeout_secs`.
async fn serve_with(
  status: StatusCode,
  body: &'static str,
  delay: Duration,
  timeout_secs: u64,
) -> (ArxivClient, Hits) {
  let hits = Hits::default();
  let seen = hits.clone();
  let app = Router::new().route(
    "/api/query",
    get(move |Query(params): Query<HashMap<String, String>>| {
      let seen = seen.clone();
      async move {
        seen.count.fetch_add(1, Ordering::SeqCst);
        seen.queries.lock().unwrap().push(params);
        tokio::time::sleep(delay).await;
        (status, body)
      }
    }),
  );
  let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr: SocketAddr = listener.local_addr().unwrap();
  tokio::spawn(async move {
    axum::serve(listener, app).await.unwrap();
  });

  let config = FeedConfig {
    endpoint: format!("http://{addr}/api/query"),
    lookup: RetryPolicy { max_attempts: 3, retry_wait_secs: 0, timeout_secs },
    ..FeedConfig::default()
  };
  (ArxivClient::new(&config).unwrap(), hits)
}

#[tokio::test]
async fn test_lookup_without_match_is_single_round_trip() {
  let (client, hits) = serve(StatusCode::OK, EMPTY_FEED).await;

  assert_eq!(client.resolve_by_title("No Such Paper").await, Lookup::NotFound);
  assert_eq!(hits.count.load(Ordering::SeqCst), 1);
  assert_eq!(hits.queries.lock().unwrap()[0]["search_query"], "ti:\"No Such Paper\"");
}

#[traced_test]
#[tokio::test]
async fn test_lookup_exhausts_retries_on_server_error() {
  let (client, hits) = serve(StatusCode::INTERNAL_SERVER_ERROR, "boom").await;

  match client.resolve_by_title("Anything").await {
    Lookup::Exhausted { attempts, last_error } => {
      assert_eq!(attempts, 3);
      assert!(last_error.contains("500"));
    },
    other => panic!("expected exhausted lookup, got {other:?}"),
  }
  assert_eq!(hits.count.load(Ordering::SeqCst), 3);
  assert!(logs_contain("(attempt 3/3)"));
}

#[traced_test]
#[tokio::test]
async fn test_lookup_exhausts_retries_on_slow_server() {
  let (client, hits) =
    serve_with(StatusCode::OK, LOOKUP_FEED, Duration::from_secs(2), 1).await;

  let outcome = client.resolve_by_title("Sparse Attention").await;
  assert!(matches!(outcome, Lookup::Exhausted { attempts: 3, .. }), "got {outcome:?}");
  assert_eq!(hits.count.load(Ordering::SeqCst), 3);
  assert!(logs_contain("(attempt 3/3)"));
}

#[tokio::test]
async fn test_lookup_found() {
  let (client, _) = serve(StatusCode::OK, LOOKUP_FEED).await;

  let resolved = client.resolve_by_title("Sparse Attention").await.found().unwrap();
  assert_eq!(resolved.arxiv_id, "2401.12345v2");
  assert_eq!(resolved.url, "https://arxiv.org/abs/2401.12345v2");
  assert_eq!(resolved.abstract_text, "We prune attention heads.");
}

#[tokio::test]
async fn test_fetch_recent_filters_window_and_caps() -> TestResult<()> {
  let (client, hits) = serve(StatusCode::OK, LISTING_FEED).await;
  let window = FeedWindow::past_days(now(), 7)?;
  let categories = vec!["cs.LG".to_string(), "cs.AI".to_string()];

  let all = client.fetch_recent(window, &categories, 10).await?;
  let titles: Vec<&str> = all.iter().map(|paper| paper.title.as_str()).collect();
  assert_eq!(titles, vec!["Newest", "Middle"]);
  assert!(all.iter().all(|paper| window.contains(&paper.published_at)));

  let capped = client.fetch_recent(window, &categories, 1).await?;
  assert_eq!(capped.len(), 1);

  let queries = hits.queries.lock().unwrap();
  assert_eq!(queries.len(), 2);
  assert_eq!(
    queries[0]["search_query"],
    "(cat:cs.LG OR cat:cs.AI) AND submittedDate:[202401131200 TO 202401201200]"
  );
  assert_eq!(queries[0]["sortBy"], "submittedDate");
  assert_eq!(queries[0]["sortOrder"], "descending");
  assert_eq!(queries[1]["max_results"], "1");
  Ok(())
}

#[tokio::test]
async fn test_fetch_recent_propagates_server_error() {
  let (client, hits) = serve(StatusCode::SERVICE_UNAVAILABLE, "down").await;
  let window = FeedWindow::past_days(now(), 7).unwrap();
  let result = client.fetch_recent(window, &[], 10).await;

  assert!(matches!(result, Err(CuratorError::ApiError(_))));
  assert_eq!(hits.count.load(Ordering::SeqCst), 1);
}

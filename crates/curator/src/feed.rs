//! Client for listing and looking up papers on arXiv.
//!
//! The client speaks arXiv's Atom API (`https://export.arxiv.org/api/query`) and offers the two
//! calls a curation run needs:
//!
//! - [`FeedSource::fetch_recent`]: one listing request for a submission window over a fixed set
//!   of categories, newest first. No pagination and no retry; a transport error fails the run.
//! - [`FeedSource::resolve_by_title`]: an exact-title search used by the backfill sweeps, retried
//!   a bounded number of times with a fixed pause.
//!
//! # Examples
//!
//! ```no_run
//! use chrono::Utc;
//! use curator::{
//!   configuration::FeedConfig,
//!   feed::{ArxivClient, FeedSource, FeedWindow},
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FeedConfig::default();
//! let client = ArxivClient::new(&config)?;
//! let window = FeedWindow::past_days(Utc::now(), 7)?;
//! let papers = client.fetch_recent(window, &config.categories, 100).await?;
//! println!("{} candidates", papers.len());
//! # Ok(())
//! # }
//! ```

use quick_xml::de::from_str;

use super::*;

/// Timestamp layout arXiv expects inside `submittedDate:[.. TO ..]`.
const SUBMITTED_DATE_FORMAT: &str = "%Y%m%d%H%M";

/// Source of candidate papers and title lookups.
#[async_trait]
pub trait FeedSource: Send + Sync {
  /// Lists papers submitted within `window` in any of `categories`, newest first.
  ///
  /// Never returns more than `max_results` entries, nor entries published outside the window.
  ///
  /// # Errors
  ///
  /// Transport and decode failures propagate unretried.
  async fn fetch_recent(
    &self,
    window: FeedWindow,
    categories: &[String],
    max_results: usize,
  ) -> Result<Vec<CandidatePaper>>;

  /// Best-effort lookup of a paper by its exact title.
  ///
  /// Never fails: transport problems are retried and, once the retry budget is spent, reported
  /// as [`Lookup::Exhausted`].
  async fn resolve_by_title(&self, title: &str) -> Lookup;
}

/// Closed submission window `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedWindow {
  /// Inclusive lower bound
  pub start: DateTime<Utc>,
  /// Inclusive upper bound
  pub end:   DateTime<Utc>,
}

impl FeedWindow {
  /// Window covering the `days` days that end at `end`.
  ///
  /// # Errors
  ///
  /// Returns [`CuratorError::InvalidWindow`] if the start would fall before the earliest
  /// representable date.
  pub fn past_days(end: DateTime<Utc>, days: u32) -> Result<Self> {
    let start = end
      .checked_sub_signed(chrono::Duration::days(i64::from(days)))
      .ok_or(CuratorError::InvalidWindow(days))?;
    Ok(Self { start, end })
  }

  /// Whether `instant` lies inside the window, bounds included.
  pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
    self.start <= *instant && *instant <= self.end
  }

  /// The `submittedDate` clause for this window.
  fn submitted_date_clause(&self) -> String {
    format!(
      "submittedDate:[{} TO {}]",
      self.start.format(SUBMITTED_DATE_FORMAT),
      self.end.format(SUBMITTED_DATE_FORMAT)
    )
  }
}

/// Outcome of [`FeedSource::resolve_by_title`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
  /// The feed had at least one match; the best one is returned.
  Found(ResolvedPaper),
  /// The feed answered and had no match.
  NotFound,
  /// Every attempt failed in transport; the feed never answered.
  Exhausted {
    /// Attempts made
    attempts:   u32,
    /// Error from the final attempt
    last_error: String,
  },
}

impl Lookup {
  /// The resolved paper, if any. Callers that do not care why nothing was found use this.
  pub fn found(self) -> Option<ResolvedPaper> {
    match self {
      Lookup::Found(paper) => Some(paper),
      _ => None,
    }
  }
}

/// Metadata recovered for a title lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaper {
  /// Whitespace-normalised abstract
  pub abstract_text: String,
  /// Canonical abstract link
  pub url:           String,
  /// Identifier including its version suffix, e.g. `2401.12345v1`
  pub arxiv_id:      String,
}

/// Atom feed as returned by the arXiv API.
#[derive(Debug, Deserialize)]
struct Feed {
  /// Matching entries, absent entirely when nothing matched
  #[serde(rename = "entry", default)]
  entries: Vec<Entry>,
}

/// One Atom entry. Only the fields the pipeline uses are captured.
#[derive(Debug, Deserialize)]
struct Entry {
  /// Abs-page URL, e.g. `http://arxiv.org/abs/2401.12345v1`
  id:        String,
  /// Title, wrapped across lines
  #[serde(default)]
  title:     String,
  /// Abstract, wrapped across lines
  #[serde(default)]
  summary:   String,
  /// RFC 3339 publication timestamp
  #[serde(default)]
  published: String,
  /// Authors in listing order
  #[serde(rename = "author", default)]
  authors:   Vec<EntryAuthor>,
}

/// Author element of an entry.
#[derive(Debug, Deserialize)]
struct EntryAuthor {
  /// Author's full name
  name: String,
}

/// Client for the arXiv Atom API.
#[derive(Debug, Clone)]
pub struct ArxivClient {
  /// Internal web client used to connect to the API.
  client:          reqwest::Client,
  /// Query endpoint
  endpoint:        Url,
  /// Timeout for listing requests
  listing_timeout: Duration,
  /// Retry policy for title lookups
  lookup:          RetryPolicy,
}

impl ArxivClient {
  /// Creates a client from feed settings.
  ///
  /// # Errors
  ///
  /// Returns [`CuratorError::MissingConfiguration`] if the endpoint is not a valid URL.
  pub fn new(config: &FeedConfig) -> Result<Self> {
    let endpoint = Url::parse(&config.endpoint).map_err(|e| {
      CuratorError::MissingConfiguration(format!("invalid feed endpoint {}: {e}", config.endpoint))
    })?;
    Ok(Self {
      client: reqwest::Client::new(),
      endpoint,
      listing_timeout: Duration::from_secs(config.timeout_secs),
      lookup: config.lookup,
    })
  }

  /// Builds the listing URL for a window and category set.
  pub fn listing_url(&self, window: &FeedWindow, categories: &[String], max_results: usize) -> Url {
    let mut url = self.endpoint.clone();
    url
      .query_pairs_mut()
      .append_pair("search_query", &listing_query(window, categories))
      .append_pair("start", "0")
      .append_pair("max_results", &max_results.to_string())
      .append_pair("sortBy", "submittedDate")
      .append_pair("sortOrder", "descending");
    url
  }

  /// Builds the exact-title lookup URL.
  pub fn lookup_url(&self, title: &str) -> Url {
    let mut url = self.endpoint.clone();
    url
      .query_pairs_mut()
      .append_pair("search_query", &format!("ti:\"{}\"", title.replace('"', "")))
      .append_pair("start", "0")
      .append_pair("max_results", "1");
    url
  }

  /// Issues a GET and returns the body of a successful response.
  async fn get_text(&self, url: Url, timeout: Duration) -> Result<String> {
    debug!("Fetching from arXiv via: {url}");
    let response = self.client.get(url).timeout(timeout).send().await?;
    let status = response.status();
    let body = response.text().await?;
    trace!("arXiv response: {body}");
    if !status.is_success() {
      return Err(CuratorError::ApiError(format!("arXiv returned {status}: {body}")));
    }
    Ok(body)
  }

  /// One lookup attempt: `Ok(None)` means the feed answered with no match.
  async fn lookup_once(&self, url: Url) -> Result<Option<ResolvedPaper>> {
    let body = self.get_text(url, Duration::from_secs(self.lookup.timeout_secs)).await?;
    let feed: Feed = from_str(&body)?;
    Ok(feed.entries.into_iter().next().map(|entry| {
      let arxiv_id = entry.id.trim().trim_end_matches('/').rsplit('/').next().unwrap_or_default();
      ResolvedPaper {
        abstract_text: normalize_whitespace(&entry.summary),
        url:           format!("{ARXIV_ABS_BASE}{arxiv_id}"),
        arxiv_id:      arxiv_id.to_string(),
      }
    }))
  }
}

#[async_trait]
impl FeedSource for ArxivClient {
  async fn fetch_recent(
    &self,
    window: FeedWindow,
    categories: &[String],
    max_results: usize,
  ) -> Result<Vec<CandidatePaper>> {
    let url = self.listing_url(&window, categories, max_results);
    let body = self.get_text(url, self.listing_timeout).await?;
    let candidates = parse_candidates(&body, &window, max_results)?;
    info!(
      "Listed {} candidate papers submitted between {} and {}",
      candidates.len(),
      window.start,
      window.end
    );
    Ok(candidates)
  }

  async fn resolve_by_title(&self, title: &str) -> Lookup {
    let url = self.lookup_url(title);
    let attempts = self.lookup.max_attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
      match self.lookup_once(url.clone()).await {
        Ok(Some(paper)) => return Lookup::Found(paper),
        Ok(None) => return Lookup::NotFound,
        Err(e) => {
          warn!("arXiv lookup for \"{title}\" failed (attempt {attempt}/{attempts}): {e}");
          last_error = e.to_string();
          if attempt < attempts {
            tokio::time::sleep(Duration::from_secs(self.lookup.retry_wait_secs)).await;
          }
        },
      }
    }

    Lookup::Exhausted { attempts, last_error }
  }
}

/// The `search_query` expression for a listing.
fn listing_query(window: &FeedWindow, categories: &[String]) -> String {
  let categories = categories
    .iter()
    .map(|c| c.trim())
    .filter(|c| !c.is_empty())
    .map(|c| format!("cat:{c}"))
    .collect::<Vec<_>>();
  if categories.is_empty() {
    window.submitted_date_clause()
  } else {
    format!("({}) AND {}", categories.join(" OR "), window.submitted_date_clause())
  }
}

/// Decodes a listing response into candidates inside `window`, at most `max_results` of them.
fn parse_candidates(
  body: &str,
  window: &FeedWindow,
  max_results: usize,
) -> Result<Vec<CandidatePaper>> {
  let feed: Feed = from_str(body)?;
  let candidates = feed
    .entries
    .into_iter()
    .filter_map(|entry| {
      let published_at = match DateTime::parse_from_rfc3339(entry.published.trim()) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(e) => {
          warn!("Skipping entry {} with unreadable publication date: {e}", entry.id);
          return None;
        },
      };
      if !window.contains(&published_at) {
        warn!("Skipping entry {} published outside the window at {published_at}", entry.id);
        return None;
      }
      Some(CandidatePaper {
        title: normalize_whitespace(&entry.title),
        authors: entry.authors.into_iter().map(|a| normalize_whitespace(&a.name)).collect(),
        published_at,
        source_id: entry.id.trim().to_string(),
        summary: normalize_whitespace(&entry.summary),
      })
    })
    .take(max_results)
    .collect();
  Ok(candidates)
}

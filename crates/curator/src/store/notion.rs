//! [`DocumentStore`] backed by a Notion database.
//!
//! The database is expected to carry four properties:
//!
//! | Property   | Type         | Use                                  |
//! |------------|--------------|--------------------------------------|
//! | `Name`     | title        | paper title                          |
//! | `URL`      | url          | canonical arXiv link                 |
//! | `Abstract` | rich_text    | abstract or summary                  |
//! | `Rating`   | multi_select | owner's score, first option as 1–5   |

use serde::de::DeserializeOwned;

use super::*;

/// Notion rejects rich-text objects longer than this many characters.
const RICH_TEXT_LIMIT: usize = 2000;
/// Largest page Notion serves from a database query.
const PAGE_SIZE: usize = 100;

/// Title property name.
const NAME: &str = "Name";
/// Link property name.
const URL: &str = "URL";
/// Abstract property name.
const ABSTRACT: &str = "Abstract";

/// Client for one Notion database.
#[derive(Clone)]
pub struct NotionClient {
  /// Shared HTTP client
  client:      reqwest::Client,
  /// API base
  base_url:    String,
  /// `Notion-Version` header value
  version:     String,
  /// Integration token
  token:       String,
  /// Database holding the collection
  database_id: String,
}

/// One page of a database query.
#[derive(Debug, Deserialize)]
struct QueryResponse {
  /// Pages on this page of results
  #[serde(default)]
  results:     Vec<Page>,
  /// Whether another page follows
  #[serde(default)]
  has_more:    bool,
  /// Cursor for the next page
  #[serde(default)]
  next_cursor: Option<String>,
}

/// A Notion page as returned by query, retrieve and create.
#[derive(Debug, Deserialize)]
struct Page {
  /// Page id
  id:         String,
  /// Properties the collection uses; others are ignored
  #[serde(default)]
  properties: PageProperties,
}

/// The collection's properties on a page.
#[derive(Debug, Default, Deserialize)]
struct PageProperties {
  /// Title
  #[serde(rename = "Name", default)]
  name:          Option<TitleProperty>,
  /// Link
  #[serde(rename = "URL", default)]
  url:           Option<UrlProperty>,
  /// Abstract
  #[serde(rename = "Abstract", default)]
  abstract_text: Option<RichTextProperty>,
  /// Rating
  #[serde(rename = "Rating", default)]
  rating:        Option<MultiSelectProperty>,
}

/// Title property value.
#[derive(Debug, Default, Deserialize)]
struct TitleProperty {
  /// Title fragments
  #[serde(default)]
  title: Vec<RichText>,
}

/// Rich-text property value.
#[derive(Debug, Default, Deserialize)]
struct RichTextProperty {
  /// Text fragments
  #[serde(default)]
  rich_text: Vec<RichText>,
}

/// URL property value.
#[derive(Debug, Default, Deserialize)]
struct UrlProperty {
  /// The link, null when unset
  #[serde(default)]
  url: Option<String>,
}

/// Multi-select property value.
#[derive(Debug, Default, Deserialize)]
struct MultiSelectProperty {
  /// Selected options in display order
  #[serde(default)]
  multi_select: Vec<SelectOption>,
}

/// One selected option.
#[derive(Debug, Deserialize)]
struct SelectOption {
  /// Option label
  name: String,
}

/// One rich-text fragment.
#[derive(Debug, Deserialize)]
struct RichText {
  /// Rendered text, present on reads
  #[serde(default)]
  plain_text: Option<String>,
  /// Raw text object
  #[serde(default)]
  text:       Option<TextContent>,
}

/// Raw text object.
#[derive(Debug, Deserialize)]
struct TextContent {
  /// Text content
  content: String,
}

impl RichText {
  /// The fragment's text, whichever form the API returned.
  fn as_str(&self) -> &str {
    self
      .plain_text
      .as_deref()
      .or_else(|| self.text.as_ref().map(|text| text.content.as_str()))
      .unwrap_or_default()
  }
}

/// Concatenates fragments, treating whitespace-only text as absent.
fn join_fragments(fragments: &[RichText]) -> Option<String> {
  let text: String = fragments.iter().map(RichText::as_str).collect();
  let text = text.trim();
  (!text.is_empty()).then(|| text.to_string())
}

impl Page {
  /// Title text, if any.
  fn name(&self) -> Option<String> {
    self.properties.name.as_ref().and_then(|name| join_fragments(&name.title))
  }

  /// Link, if set and non-blank.
  fn url(&self) -> Option<String> {
    self
      .properties
      .url
      .as_ref()
      .and_then(|url| url.url.clone())
      .filter(|url| !url.trim().is_empty())
  }

  /// Abstract text, if any.
  fn abstract_text(&self) -> Option<String> {
    self.properties.abstract_text.as_ref().and_then(|text| join_fragments(&text.rich_text))
  }

  /// First selected rating option, if it is a valid score.
  fn rating(&self) -> Option<Rating> {
    let option = self.properties.rating.as_ref()?.multi_select.first()?;
    match option.name.parse() {
      Ok(rating) => Some(rating),
      Err(e) => {
        warn!("Ignoring rating on page {}: {e}", self.id);
        None
      },
    }
  }

  /// Listing view of the page, `None` when it has no title.
  fn into_listing(self) -> Option<StoreListing> {
    let Some(name) = self.name() else {
      warn!("Skipping untitled page {}", self.id);
      return None;
    };
    let url = self.url();
    let has_abstract = self.abstract_text().is_some();
    Some(StoreListing { id: self.id, name, url, has_abstract })
  }

  /// Full view of the page.
  fn into_entry(self) -> StoreEntry {
    StoreEntry {
      name:          self.name().unwrap_or_default(),
      url:           self.url(),
      abstract_text: self.abstract_text(),
      rating:        self.rating(),
      id:            self.id,
    }
  }
}

/// Splits text into rich-text objects no longer than Notion accepts.
fn rich_text(text: &str) -> Value {
  let chars: Vec<char> = text.chars().collect();
  let fragments: Vec<Value> = chars
    .chunks(RICH_TEXT_LIMIT)
    .map(|chunk| {
      serde_json::json!({ "type": "text", "text": { "content": chunk.iter().collect::<String>() } })
    })
    .collect();
  Value::Array(fragments)
}

/// Property payload for a new page.
fn create_properties(entry: &NewEntry) -> Value {
  serde_json::json!({
    NAME: { "title": [{ "text": { "content": entry.name } }] },
    URL: { "url": entry.url },
    ABSTRACT: { "type": "rich_text", "rich_text": rich_text(&entry.abstract_text) },
  })
}

/// Property payload for a partial update.
fn patch_properties(patch: &EntryPatch) -> Value {
  let mut properties = serde_json::Map::new();
  if let Some(url) = &patch.url {
    properties.insert(URL.to_string(), serde_json::json!({ "url": url }));
  }
  if let Some(text) = &patch.abstract_text {
    properties.insert(ABSTRACT.to_string(), serde_json::json!({ "rich_text": rich_text(text) }));
  }
  Value::Object(properties)
}

impl NotionClient {
  /// Creates a client for the database named in `credentials`.
  pub fn new(config: &NotionConfig, credentials: &Credentials) -> Self {
    Self {
      client:      reqwest::Client::new(),
      base_url:    config.base_url.trim_end_matches('/').to_string(),
      version:     config.version.clone(),
      token:       credentials.notion_token.clone(),
      database_id: credentials.notion_db_id.clone(),
    }
  }

  /// A request against `path` with auth and version headers set.
  fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
    let url = format!("{}/{path}", self.base_url);
    debug!("Notion {method} {url}");
    self
      .client
      .request(method, url)
      .bearer_auth(&self.token)
      .header("Notion-Version", &self.version)
  }

  /// Sends a request and decodes a successful response.
  ///
  /// A 404 becomes [`CuratorError::NotFound`]; any other failure status is an
  /// [`CuratorError::ApiError`] carrying the body.
  async fn execute<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;
    trace!("Notion response: {body}");
    if status == reqwest::StatusCode::NOT_FOUND {
      debug!("Notion returned 404: {body}");
      return Err(CuratorError::NotFound);
    }
    if !status.is_success() {
      return Err(CuratorError::ApiError(format!("Notion returned {status}: {body}")));
    }
    Ok(serde_json::from_str(&body)?)
  }
}

#[async_trait]
impl DocumentStore for NotionClient {
  async fn list(&self) -> Result<Vec<StoreListing>> {
    let path = format!("databases/{}/query", self.database_id);
    let mut listings = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
      let mut body = serde_json::json!({ "page_size": PAGE_SIZE });
      if let Some(cursor) = &cursor {
        body["start_cursor"] = Value::String(cursor.clone());
      }
      let page: QueryResponse =
        self.execute(self.request(reqwest::Method::POST, &path).json(&body)).await?;
      listings.extend(page.results.into_iter().filter_map(Page::into_listing));

      match page.next_cursor {
        Some(next) if page.has_more => cursor = Some(next),
        _ => break,
      }
    }

    debug!("Listed {} entries from Notion", listings.len());
    Ok(listings)
  }

  async fn retrieve(&self, id: &str) -> Result<StoreEntry> {
    let page: Page =
      self.execute(self.request(reqwest::Method::GET, &format!("pages/{id}"))).await?;
    Ok(page.into_entry())
  }

  async fn create(&self, entry: &NewEntry) -> Result<String> {
    let body = serde_json::json!({
      "parent": { "database_id": self.database_id },
      "properties": create_properties(entry),
    });
    let page: Page = self.execute(self.request(reqwest::Method::POST, "pages").json(&body)).await?;
    Ok(page.id)
  }

  async fn update(&self, id: &str, patch: &EntryPatch) -> Result<()> {
    if patch.is_empty() {
      return Ok(());
    }
    let body = serde_json::json!({ "properties": patch_properties(patch) });
    let _: Page = self
      .execute(self.request(reqwest::Method::PATCH, &format!("pages/{id}")).json(&body))
      .await?;
    Ok(())
  }
}

//! Client implementation for the language-model scoring service.
//!
//! Ranking is delegated entirely to a chat-completions endpoint (OpenAI or anything speaking the
//! same protocol). Two modes are used:
//!
//! - free text, for prose such as the interest description and the relevance shortlist
//! - schema-constrained output, for extracting a [`PaperList`] from that prose
//!
//! Nothing here retries; callers treat every failure as fatal to the run.
//!
//! # Examples
//!
//! ```no_run
//! use curator::llm::CompletionRequest;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = reqwest::Client::new();
//! let response = CompletionRequest::new()
//!   .with_host("https://api.openai.com/v1")
//!   .with_api_key("sk-...")
//!   .with_model("gpt-4.1")
//!   .with_message("Summarize the idea behind speculative decoding.")
//!   .send(&client)
//!   .await?;
//!
//! println!("{}", response.text().unwrap_or_default());
//! # Ok(())
//! # }
//! ```

use super::*;

/// Path of the completions endpoint below the API base.
const CHAT_COMPLETIONS: &str = "chat/completions";

/// Gateway to the external model used for ranking and synthesis.
#[async_trait]
pub trait ScoringGateway: Send + Sync {
  /// Free-form completion of a single user prompt.
  async fn complete_text(&self, prompt: &str) -> Result<String>;

  /// Completion constrained to `schema`, returned as parsed JSON.
  ///
  /// # Errors
  ///
  /// Returns [`CuratorError::SchemaValidation`] when the model refuses or its output is not JSON.
  async fn complete_structured(
    &self,
    system: &str,
    prompt: &str,
    schema: &OutputSchema,
  ) -> Result<Value>;
}

/// A named JSON schema the model output must conform to.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
  /// Identifier reported to the endpoint
  pub name:   String,
  /// The JSON schema itself
  pub schema: Value,
}

impl OutputSchema {
  /// Schema for the structured extraction stage.
  pub fn paper_list() -> Self {
    Self { name: PaperList::SCHEMA_NAME.to_string(), schema: PaperList::schema() }
  }
}

/// Speaker of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  /// Instructions framing the conversation
  System,
  /// The prompt
  User,
  /// Model output
  Assistant,
}

/// Message structure for chat completions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
  /// Who is speaking
  pub role:    Role,
  /// What was said
  pub content: String,
}

/// Output mode requested from the endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
  /// Strict JSON-schema output
  JsonSchema {
    /// The schema and its settings
    json_schema: JsonSchemaFormat,
  },
}

/// Body of a [`ResponseFormat::JsonSchema`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonSchemaFormat {
  /// Schema name
  pub name:   String,
  /// Whether the endpoint must adhere exactly
  pub strict: bool,
  /// The schema
  pub schema: Value,
}

/// Request builder for chat completions.
///
/// ```no_run
/// # use curator::llm::CompletionRequest;
/// let request = CompletionRequest::new()
///   .with_model("gpt-4.1")
///   .with_system("Extract the paper information.")
///   .with_message("...");
/// ```
#[derive(Debug, Serialize, Default)]
pub struct CompletionRequest {
  /// Model to use. Sending without one is an error.
  pub model:           Option<String>,
  /// Conversation so far, in order. Must not be empty when sent.
  pub messages:        Vec<Message>,
  /// Structured-output constraint, absent for free text
  #[serde(skip_serializing_if = "Option::is_none")]
  pub response_format: Option<ResponseFormat>,
  /// Endpoint URL. Skipped during serialization.
  #[serde(skip)]
  pub url:             Option<Url>,
  /// Bearer token. Skipped during serialization.
  #[serde(skip)]
  api_key:             Option<String>,
}

/// Response of a chat completion.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
  /// Model that answered
  #[serde(default)]
  pub model:   String,
  /// Candidate completions; only the first is used
  #[serde(default)]
  pub choices: Vec<Choice>,
}

/// One candidate completion.
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
  /// The generated message
  pub message:       ChoiceMessage,
  /// Why generation stopped
  #[serde(default)]
  pub finish_reason: Option<String>,
}

/// Content of a generated message.
#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
  /// Generated text, absent on refusal
  #[serde(default)]
  pub content: Option<String>,
  /// Refusal explanation under structured output
  #[serde(default)]
  pub refusal: Option<String>,
}

impl CompletionRequest {
  /// Creates a new request with builder-style API with default settings.
  pub fn new() -> Self { Self::default() }

  /// Sets the API base the completions path is appended to.
  pub fn with_host(mut self, host: &str) -> Self {
    let base = if host.ends_with('/') { host.to_string() } else { format!("{host}/") };
    self.url = Url::parse(&base).and_then(|base| base.join(CHAT_COMPLETIONS)).ok();
    if self.url.is_none() {
      warn!("Ignoring unparseable LLM host {host}");
    }
    self
  }

  /// Sets the bearer token.
  pub fn with_api_key(mut self, key: &str) -> Self {
    self.api_key = Some(key.to_string());
    self
  }

  /// Sets the model to use for the request.
  pub fn with_model(mut self, model: &str) -> Self {
    self.model.replace(model.to_string());
    self
  }

  /// Adds a system message.
  pub fn with_system(mut self, content: &str) -> Self {
    self.messages.push(Message { role: Role::System, content: content.to_string() });
    self
  }

  /// Adds a user message.
  pub fn with_message(mut self, content: &str) -> Self {
    self.messages.push(Message { role: Role::User, content: content.to_string() });
    self
  }

  /// Constrains the output to `schema`.
  pub fn with_schema(mut self, schema: &OutputSchema) -> Self {
    self.response_format = Some(ResponseFormat::JsonSchema {
      json_schema: JsonSchemaFormat {
        name:   schema.name.clone(),
        strict: true,
        schema: schema.schema.clone(),
      },
    });
    self
  }

  /// Sends the request.
  ///
  /// # Errors
  ///
  /// This function will return an error if:
  /// - No model is specified
  /// - No messages are provided
  /// - The network request fails or the endpoint answers with a non-success status
  /// - The response cannot be parsed
  pub async fn send(&self, client: &reqwest::Client) -> Result<CompletionResponse> {
    if self.model.is_none() {
      return Err(CuratorError::LlmMissingModel);
    }
    if self.messages.is_empty() {
      return Err(CuratorError::LlmMissingMessage);
    }
    let url = match &self.url {
      Some(url) => url.clone(),
      None => {
        warn!("No LLM host set, using the OpenAI API");
        Url::parse(&LlmConfig::default().base_url)
          .and_then(|base| base.join(&format!("v1/{CHAT_COMPLETIONS}")))
          .map_err(|e| CuratorError::MissingConfiguration(e.to_string()))?
      },
    };

    debug!("Sending completion request to {url} ({} messages)", self.messages.len());
    let mut request = client.post(url).json(self);
    if let Some(key) = &self.api_key {
      request = request.bearer_auth(key);
    }
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(CuratorError::ApiError(format!("completion endpoint returned {status}: {body}")));
    }
    let completion: CompletionResponse = response.json().await?;
    trace!("Completion response: {completion:?}");
    Ok(completion)
  }
}

impl CompletionResponse {
  /// Text of the first choice, if any.
  pub fn text(&self) -> Option<&str> {
    self.choices.first().and_then(|choice| choice.message.content.as_deref())
  }

  /// Parses the first choice as schema-constrained JSON.
  ///
  /// # Errors
  ///
  /// Returns [`CuratorError::SchemaValidation`] on refusal, missing content or invalid JSON.
  pub fn structured(&self) -> Result<Value> {
    let choice = self
      .choices
      .first()
      .ok_or_else(|| CuratorError::SchemaValidation("completion had no choices".into()))?;
    if let Some(refusal) = &choice.message.refusal {
      return Err(CuratorError::SchemaValidation(format!("model refused: {refusal}")));
    }
    let content = choice
      .message
      .content
      .as_deref()
      .filter(|content| !content.trim().is_empty())
      .ok_or_else(|| CuratorError::SchemaValidation("completion had no content".into()))?;
    serde_json::from_str(content).map_err(|e| CuratorError::SchemaValidation(e.to_string()))
  }
}

/// [`ScoringGateway`] backed by an OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct OpenAiClient {
  /// Shared HTTP client
  client:   reqwest::Client,
  /// API base
  base_url: String,
  /// API key
  api_key:  String,
  /// Model identifier
  model:    String,
}

impl OpenAiClient {
  /// Creates a gateway from settings and an API key.
  pub fn new(config: &LlmConfig, api_key: &str) -> Self {
    Self {
      client:   reqwest::Client::new(),
      base_url: config.base_url.clone(),
      api_key:  api_key.to_string(),
      model:    config.model.clone(),
    }
  }

  /// A request preloaded with host, key and model.
  fn request(&self) -> CompletionRequest {
    CompletionRequest::new()
      .with_host(&self.base_url)
      .with_api_key(&self.api_key)
      .with_model(&self.model)
  }
}

#[async_trait]
impl ScoringGateway for OpenAiClient {
  async fn complete_text(&self, prompt: &str) -> Result<String> {
    let response = self.request().with_message(prompt).send(&self.client).await?;
    response
      .text()
      .map(str::to_string)
      .ok_or_else(|| CuratorError::ApiError("completion had no text".into()))
  }

  async fn complete_structured(
    &self,
    system: &str,
    prompt: &str,
    schema: &OutputSchema,
  ) -> Result<Value> {
    let response = self
      .request()
      .with_system(system)
      .with_message(prompt)
      .with_schema(schema)
      .send(&self.client)
      .await?;
    response.structured()
  }
}

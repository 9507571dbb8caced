use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::LLMConfig;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_REFERER: &str = "http://localhost:8000";
pub const DEFAULT_APP_TITLE: &str = "StudyBuddy App";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const MODEL_LIST_TIMEOUT: Duration = Duration::from_secs(10);

/// Free models in priority order; the first entry has been the most reliable.
pub const DEFAULT_MODELS: [&str; 6] = [
    "deepseek/deepseek-r1:free",
    "deepseek/deepseek-v3:free",
    "mistralai/mistral-7b-instruct:free",
    "meta-llama/llama-3.2-3b-instruct:free",
    "microsoft/phi-3-mini-128k-instruct:free",
    "google/gemma-2-2b-it:free",
];

/// Ordered list of candidate models shared by every generation task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCatalog {
    models: Vec<String>,
}

impl ModelCatalog {
    pub fn new(models: Vec<String>) -> Self {
        Self { models }
    }

    /// Parse a comma-separated override, keeping the default catalog when it names no models
    pub fn from_override(raw: Option<&str>) -> Self {
        let models: Vec<String> = raw
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect();

        if models.is_empty() {
            Self::default()
        } else {
            Self::new(models)
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(String::as_str)
    }

    pub fn first(&self) -> Option<&str> {
        self.models.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_MODELS.iter().map(|m| m.to_string()).collect())
    }
}

/// Common message structure for chat-completion requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMMessage {
    pub role: String,
    pub content: String,
}

/// One completion call: model, prompt and sampling budget
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Overrides the client's default bounded wait
    pub timeout: Option<Duration>,
}

/// Every way a single completion call can end. Provider failures never escape as errors.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionOutcome {
    Success(String),
    RateLimited,
    HttpError { status: u16, body: String },
    NetworkError(String),
    Timeout,
    Unconfigured,
}

impl CompletionOutcome {
    /// Stable short name used as the `outcome` log field
    pub fn label(&self) -> &'static str {
        match self {
            CompletionOutcome::Success(_) => "success",
            CompletionOutcome::RateLimited => "rate_limited",
            CompletionOutcome::HttpError { .. } => "http_error",
            CompletionOutcome::NetworkError(_) => "network_error",
            CompletionOutcome::Timeout => "timeout",
            CompletionOutcome::Unconfigured => "unconfigured",
        }
    }
}

impl fmt::Display for CompletionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionOutcome::Success(text) => write!(f, "success ({} chars)", text.len()),
            CompletionOutcome::RateLimited => write!(f, "rate limited"),
            CompletionOutcome::HttpError { status, body } => {
                let preview: String = body.chars().take(200).collect();
                write!(f, "HTTP {}: {}", status, preview)
            }
            CompletionOutcome::NetworkError(reason) => write!(f, "network error: {}", reason),
            CompletionOutcome::Timeout => write!(f, "timed out"),
            CompletionOutcome::Unconfigured => write!(f, "API key not configured"),
        }
    }
}

/// One entry of the provider's model listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: Option<String>,
    pub context_length: Option<u64>,
    /// Prompt tokens are priced at zero
    pub free: bool,
}

/// Seam between the generation pipeline and the chat-completion provider
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Whether a credential was supplied at construction
    fn is_configured(&self) -> bool;

    fn provider_name(&self) -> &'static str;

    async fn complete(&self, request: &CompletionRequest) -> CompletionOutcome;

    /// Models the provider currently serves. Failures reuse the completion outcome variants.
    async fn list_models(&self) -> Result<Vec<ModelInfo>, CompletionOutcome> {
        Err(CompletionOutcome::HttpError {
            status: 501,
            body: format!("{} does not list models", self.provider_name()),
        })
    }
}

/// OpenRouter (OpenAI-compatible) chat-completion client
#[derive(Debug, Clone)]
pub struct OpenRouterProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    referer: String,
    app_title: String,
    timeout: Duration,
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<LLMMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ModelListing {
    #[serde(default)]
    data: Vec<ListedModel>,
}

#[derive(Debug, Clone, Deserialize)]
struct ListedModel {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    context_length: Option<u64>,
    #[serde(default)]
    pricing: Option<ListedPricing>,
}

#[derive(Debug, Clone, Deserialize)]
struct ListedPricing {
    #[serde(default)]
    prompt: Option<Value>,
}

impl From<ListedModel> for ModelInfo {
    fn from(model: ListedModel) -> Self {
        // Prices arrive as decimal strings ("0") or, occasionally, bare numbers
        let free = match model.pricing.and_then(|p| p.prompt) {
            Some(Value::String(price)) => price.trim().parse::<f64>().is_ok_and(|p| p == 0.0),
            Some(Value::Number(price)) => price.as_f64() == Some(0.0),
            _ => false,
        };
        Self {
            id: model.id,
            name: model.name,
            context_length: model.context_length,
            free,
        }
    }
}

impl OpenRouterProvider {
    pub fn new(api_key: Option<String>, base_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            referer: DEFAULT_REFERER.to_string(),
            app_title: DEFAULT_APP_TITLE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn from_config(config: &LLMConfig) -> Self {
        Self::new(config.api_key.clone(), Some(config.base_url.clone()))
            .with_timeout(Duration::from_secs(config.timeout_secs))
            .with_attribution(&config.referer, &config.app_title)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the `HTTP-Referer` and `X-Title` headers OpenRouter uses for app attribution
    pub fn with_attribution(mut self, referer: &str, app_title: &str) -> Self {
        self.referer = referer.to_string();
        self.app_title = app_title.to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn classify_transport_error(error: reqwest::Error) -> CompletionOutcome {
        if error.is_timeout() {
            CompletionOutcome::Timeout
        } else {
            CompletionOutcome::NetworkError(error.to_string())
        }
    }
}

#[async_trait]
impl CompletionClient for OpenRouterProvider {
    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn provider_name(&self) -> &'static str {
        "OpenRouter"
    }

    async fn complete(&self, request: &CompletionRequest) -> CompletionOutcome {
        let Some(api_key) = self.api_key.as_deref() else {
            return CompletionOutcome::Unconfigured;
        };

        let request_body = ChatRequest {
            model: &request.model,
            messages: vec![LLMMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!(
            provider = self.provider_name(),
            model = %request.model,
            base_url = %self.base_url,
            prompt_length = request.prompt.len(),
            max_tokens = request.max_tokens,
            "Making completion request"
        );

        let response = match self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .header("HTTP-Referer", &self.referer)
            .header("X-Title", &self.app_title)
            .timeout(request.timeout.unwrap_or(self.timeout))
            .json(&request_body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Self::classify_transport_error(e),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return Self::classify_transport_error(e),
        };

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(
                provider = self.provider_name(),
                model = %request.model,
                "Completion request rate limited"
            );
            return CompletionOutcome::RateLimited;
        }

        if status != StatusCode::OK {
            warn!(
                provider = self.provider_name(),
                model = %request.model,
                status = %status,
                error = %body.chars().take(200).collect::<String>(),
                "Completion request failed"
            );
            return CompletionOutcome::HttpError {
                status: status.as_u16(),
                body,
            };
        }

        let parsed = match serde_json::from_str::<ChatResponse>(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(
                    provider = self.provider_name(),
                    model = %request.model,
                    error = %e,
                    "Completion response body was not valid JSON"
                );
                return CompletionOutcome::HttpError {
                    status: status.as_u16(),
                    body,
                };
            }
        };

        match parsed.choices.into_iter().next() {
            Some(choice) => {
                let content = choice.message.content.unwrap_or_default();
                info!(
                    provider = self.provider_name(),
                    model = %request.model,
                    response_length = content.len(),
                    "Successfully received completion"
                );
                CompletionOutcome::Success(content)
            }
            None => {
                warn!(
                    provider = self.provider_name(),
                    model = %request.model,
                    "No choices in completion response"
                );
                CompletionOutcome::HttpError {
                    status: status.as_u16(),
                    body,
                }
            }
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, CompletionOutcome> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(CompletionOutcome::Unconfigured);
        };

        let response = self
            .client
            .get(format!("{}/models", self.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .timeout(MODEL_LIST_TIMEOUT)
            .send()
            .await
            .map_err(Self::classify_transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(Self::classify_transport_error)?;

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CompletionOutcome::RateLimited);
        }
        if status != StatusCode::OK {
            warn!(
                provider = self.provider_name(),
                status = %status,
                "Model listing request failed"
            );
            return Err(CompletionOutcome::HttpError {
                status: status.as_u16(),
                body,
            });
        }

        let listing = match serde_json::from_str::<ModelListing>(&body) {
            Ok(listing) => listing,
            Err(e) => {
                warn!(provider = self.provider_name(), error = %e, "Model listing was not valid JSON");
                return Err(CompletionOutcome::HttpError {
                    status: status.as_u16(),
                    body,
                });
            }
        };

        debug!(
            provider = self.provider_name(),
            total_models = listing.data.len(),
            "Fetched model listing"
        );
        Ok(listing.data.into_iter().map(ModelInfo::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_order() {
        let catalog = ModelCatalog::default();
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog.first(), Some("deepseek/deepseek-r1:free"));
        assert_eq!(catalog.iter().last(), Some("google/gemma-2-2b-it:free"));
    }

    #[test]
    fn test_catalog_override_parsing() {
        let catalog = ModelCatalog::from_override(Some(" model-a , ,model-b,"));
        assert_eq!(catalog.iter().collect::<Vec<_>>(), vec!["model-a", "model-b"]);

        assert_eq!(ModelCatalog::from_override(Some(" , ")), ModelCatalog::default());
        assert_eq!(ModelCatalog::from_override(None), ModelCatalog::default());
    }

    #[test]
    fn test_blank_key_is_unconfigured() {
        assert!(!OpenRouterProvider::new(None, None).is_configured());
        assert!(!OpenRouterProvider::new(Some("   ".to_string()), None).is_configured());
        assert!(OpenRouterProvider::new(Some("sk-or-v1-abc".to_string()), None).is_configured());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let provider = OpenRouterProvider::new(None, Some("http://localhost:9999/v1/".to_string()));
        assert_eq!(provider.base_url(), "http://localhost:9999/v1");
    }

    #[tokio::test]
    async fn test_unconfigured_client_makes_no_request() {
        let provider = OpenRouterProvider::new(None, Some("http://127.0.0.1:1".to_string()));
        let request = CompletionRequest {
            model: "any".to_string(),
            prompt: "hello".to_string(),
            max_tokens: 10,
            temperature: 0.2,
            timeout: None,
        };
        assert_eq!(provider.complete(&request).await, CompletionOutcome::Unconfigured);
    }

    #[test]
    fn test_listed_model_pricing_marks_free() {
        let listing: ModelListing = serde_json::from_value(serde_json::json!({
            "data": [
                { "id": "a:free", "name": "A", "context_length": 8192, "pricing": { "prompt": "0" } },
                { "id": "b", "pricing": { "prompt": "0.000001" } },
                { "id": "c", "pricing": { "prompt": 0 } },
                { "id": "d" }
            ]
        }))
        .unwrap();

        let models: Vec<ModelInfo> = listing.data.into_iter().map(ModelInfo::from).collect();
        assert_eq!(
            models.iter().map(|m| m.free).collect::<Vec<_>>(),
            vec![true, false, true, false]
        );
        assert_eq!(models[0].context_length, Some(8192));
        assert_eq!(models[3].name, None);
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(CompletionOutcome::RateLimited.label(), "rate_limited");
        assert_eq!(
            CompletionOutcome::HttpError { status: 500, body: String::new() }.label(),
            "http_error"
        );
        assert_eq!(CompletionOutcome::Timeout.to_string(), "timed out");
    }
}

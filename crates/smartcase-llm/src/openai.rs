//! OpenAI HTTP adapter
//!
//! This module invokes OpenAI's Chat Completions API in structured-output
//! mode: the record schema is attached as a `json_schema` response format,
//! so the model is constrained to the contract before extraction runs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::extract;
use crate::http::HttpClient;
use crate::types::ProviderAdapter;
use crate::{AdapterError, validate_records};
use smartcase_config::Config;
use smartcase_schema::{RecordKind, RecordSet, batch_schema};

/// Default OpenAI API endpoint
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default model when none is configured
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Provider identifier
const PROVIDER_ID: &str = "openai";

/// OpenAI adapter configuration
#[derive(Clone)]
pub(crate) struct OpenAiAdapter {
    client: Arc<HttpClient>,
    base_url: String,
    api_key: String,
    model: String,
    params: HttpParams,
    timeout: Duration,
}

/// HTTP request parameters
#[derive(Debug, Clone)]
pub(crate) struct HttpParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for HttpParams {
    fn default() -> Self {
        Self {
            max_tokens: 2048,
            temperature: 0.2,
        }
    }
}

impl OpenAiAdapter {
    /// Create a new OpenAI adapter
    ///
    /// # Errors
    ///
    /// Returns `AdapterError::Misconfiguration` if the HTTP client cannot be
    /// constructed
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        model: String,
        params: HttpParams,
        timeout: Duration,
    ) -> Result<Self, AdapterError> {
        let client = HttpClient::new()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            model,
            params,
            timeout,
        })
    }

    /// Create a new OpenAI adapter from configuration
    ///
    /// # Errors
    ///
    /// Returns `AdapterError::Misconfiguration` if:
    /// - The API key environment variable is not set
    /// - The HTTP client cannot be constructed
    pub fn new_from_config(config: &Config) -> Result<Self, AdapterError> {
        let api_key_env = config
            .llm
            .openai
            .as_ref()
            .and_then(|o| o.api_key_env.as_deref())
            .unwrap_or("OPENAI_API_KEY");

        let api_key = std::env::var(api_key_env).map_err(|_| {
            AdapterError::Misconfiguration(format!(
                "OpenAI API key not found in environment variable '{}'. \
                 Please set this variable or configure a different api_key_env in [llm.openai].",
                api_key_env
            ))
        })?;

        let base_url = config.llm.openai.as_ref().and_then(|o| o.base_url.clone());

        let model = config
            .llm
            .openai
            .as_ref()
            .and_then(|o| o.model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let params = HttpParams {
            max_tokens: config
                .llm
                .openai
                .as_ref()
                .and_then(|o| o.max_tokens)
                .unwrap_or(2048),
            temperature: config
                .llm
                .openai
                .as_ref()
                .and_then(|o| o.temperature)
                .unwrap_or(0.2),
        };

        Self::new(api_key, base_url, model, params, config.timeout())
    }

    /// Build the request body for one invocation.
    ///
    /// The record schema rides along as a `json_schema` response format;
    /// the schema root is an `items`-wrapped object because the API
    /// requires an object at the top level.
    fn request_body(&self, prompt: &str, kind: RecordKind) -> OpenAiRequest {
        OpenAiRequest {
            model: self.model.clone(),
            messages: vec![OpenAiMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: self.params.max_tokens,
            temperature: self.params.temperature,
            response_format: ResponseFormat {
                format_type: "json_schema".to_string(),
                json_schema: JsonSchemaFormat {
                    name: format!("{}_records", kind.as_str()),
                    schema: serde_json::json!({
                        "type": "object",
                        "properties": { "items": batch_schema(kind) },
                        "required": ["items"]
                    }),
                },
            },
        }
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    async fn generate(&self, prompt: &str, kind: RecordKind) -> Result<RecordSet, AdapterError> {
        debug!(
            provider = PROVIDER_ID,
            model = %self.model,
            kind = %kind,
            timeout_secs = self.timeout.as_secs(),
            "Invoking OpenAI adapter"
        );

        let request = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&self.request_body(prompt, kind));

        let response = self.client.execute(request, self.timeout, PROVIDER_ID).await?;

        let response_body: OpenAiResponse = response.json().await.map_err(|e| {
            AdapterError::InvalidResponse(format!("failed to parse OpenAI response: {e}"))
        })?;

        let choice = response_body.choices.first().ok_or_else(|| {
            AdapterError::InvalidResponse("OpenAI response missing choices[0]".to_string())
        })?;

        let content = choice.message.content.as_deref().ok_or_else(|| {
            AdapterError::InvalidResponse(
                "OpenAI response missing content in choices[0]".to_string(),
            )
        })?;

        let values = extract::extract_records(content)?;
        let records = validate_records(PROVIDER_ID, kind, values)?;

        debug!(
            provider = PROVIDER_ID,
            records = records.len(),
            "OpenAI invocation completed"
        );

        Ok(records)
    }
}

/// Chat message for requests
#[derive(Debug, Clone, Serialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

/// Structured-output response format selector
#[derive(Debug, Clone, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
    json_schema: JsonSchemaFormat,
}

/// Named schema attached to the response format
#[derive(Debug, Clone, Serialize)]
struct JsonSchemaFormat {
    name: String,
    schema: Value,
}

/// Chat Completions request body
#[derive(Debug, Clone, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    max_tokens: u32,
    temperature: f32,
    response_format: ResponseFormat,
}

/// Chat Completions response body
#[derive(Debug, Clone, Deserialize)]
struct OpenAiResponse {
    choices: Vec<Choice>,
}

/// Choice in a Chat Completions response
#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

/// Assistant message in a response
#[derive(Debug, Clone, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

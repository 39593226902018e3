//! Google Gemini HTTP adapter
//!
//! This module invokes the Gemini `generateContent` API in structured-output
//! mode: the response MIME type is pinned to JSON and the record schema is
//! attached as a `responseSchema`, so the model emits the bare array the
//! contract asks for.

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

/// Default Gemini API endpoint root
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model when none is configured
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Provider identifier
const PROVIDER_ID: &str = "gemini";

/// Gemini adapter configuration
#[derive(Clone)]
pub(crate) struct GeminiAdapter {
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

impl GeminiAdapter {
    /// Create a new Gemini adapter
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

    /// Create a new Gemini adapter from configuration
    ///
    /// The API key is read from the configured `api_key_env`, defaulting to
    /// `GEMINI_API_KEY` with `GOOGLE_API_KEY` as a fallback name.
    ///
    /// # Errors
    ///
    /// Returns `AdapterError::Misconfiguration` if:
    /// - No API key environment variable is set
    /// - The HTTP client cannot be constructed
    pub fn new_from_config(config: &Config) -> Result<Self, AdapterError> {
        let api_key = match config
            .llm
            .gemini
            .as_ref()
            .and_then(|g| g.api_key_env.as_deref())
        {
            Some(env_name) => std::env::var(env_name).map_err(|_| {
                AdapterError::Misconfiguration(format!(
                    "Gemini API key not found in environment variable '{}'. \
                     Please set this variable or configure a different api_key_env in [llm.gemini].",
                    env_name
                ))
            })?,
            None => std::env::var("GEMINI_API_KEY")
                .or_else(|_| std::env::var("GOOGLE_API_KEY"))
                .map_err(|_| {
                    AdapterError::Misconfiguration(
                        "Gemini API key not found in environment variables 'GEMINI_API_KEY' \
                         or 'GOOGLE_API_KEY'. Please set one or configure api_key_env in \
                         [llm.gemini]."
                            .to_string(),
                    )
                })?,
        };

        let base_url = config.llm.gemini.as_ref().and_then(|g| g.base_url.clone());

        let model = config
            .llm
            .gemini
            .as_ref()
            .and_then(|g| g.model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let params = HttpParams {
            max_tokens: config
                .llm
                .gemini
                .as_ref()
                .and_then(|g| g.max_tokens)
                .unwrap_or(2048),
            temperature: config
                .llm
                .gemini
                .as_ref()
                .and_then(|g| g.temperature)
                .unwrap_or(0.2),
        };

        Self::new(api_key, base_url, model, params, config.timeout())
    }

    /// Endpoint URL for this adapter's model
    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Build the request body for one invocation
    fn request_body(&self, prompt: &str, kind: RecordKind) -> GeminiRequest {
        GeminiRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: batch_schema(kind),
                max_output_tokens: self.params.max_tokens,
                temperature: self.params.temperature,
            },
        }
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    async fn generate(&self, prompt: &str, kind: RecordKind) -> Result<RecordSet, AdapterError> {
        debug!(
            provider = PROVIDER_ID,
            model = %self.model,
            kind = %kind,
            timeout_secs = self.timeout.as_secs(),
            "Invoking Gemini adapter"
        );

        let request = self
            .client
            .post(&self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&self.request_body(prompt, kind));

        let response = self.client.execute(request, self.timeout, PROVIDER_ID).await?;

        let response_body: GeminiResponse = response.json().await.map_err(|e| {
            AdapterError::InvalidResponse(format!("failed to parse Gemini response: {e}"))
        })?;

        let candidate = response_body.candidates.first().ok_or_else(|| {
            AdapterError::InvalidResponse("Gemini response missing candidates[0]".to_string())
        })?;

        // Concatenate all text parts before extraction
        let content: String = candidate
            .content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();

        if content.is_empty() {
            return Err(AdapterError::InvalidResponse(
                "Gemini response missing text content".to_string(),
            ));
        }

        let values = extract::extract_records(&content)?;
        let records = validate_records(PROVIDER_ID, kind, values)?;

        debug!(
            provider = PROVIDER_ID,
            records = records.len(),
            "Gemini invocation completed"
        );

        Ok(records)
    }
}

/// One text part in a content block
#[derive(Debug, Clone, Serialize)]
struct Part {
    text: String,
}

/// Conversation content block
#[derive(Debug, Clone, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

/// Structured-output generation settings
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
    max_output_tokens: u32,
    temperature: f32,
}

/// generateContent request body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

/// generateContent response body
#[derive(Debug, Clone, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

/// One candidate in a response
#[derive(Debug, Clone, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

/// Candidate content holding response parts
#[derive(Debug, Clone, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

/// One part of a candidate's content
#[derive(Debug, Clone, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_adapter() -> GeminiAdapter {
        GeminiAdapter::new(
            "test-key".to_string(),
            None,
            "test-model".to_string(),
            HttpParams::default(),
            Duration::from_secs(30),
        )
        .unwrap()
    }

    #[test]
    fn test_endpoint_includes_model() {
        let adapter = test_adapter();
        assert_eq!(
            adapter.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/test-model:generateContent"
        );
    }

    #[test]
    fn test_request_body_pins_json_output() {
        let adapter = test_adapter();
        let body = adapter.request_body("generate scenarios", RecordKind::Bdd);

        assert_eq!(body.contents.len(), 1);
        assert_eq!(body.contents[0].role, "user");
        assert_eq!(
            body.generation_config.response_mime_type,
            "application/json"
        );
        assert_eq!(body.generation_config.response_schema["type"], "array");
        assert!(body.generation_config.response_schema["items"]["required"]
            .as_array()
            .unwrap()
            .iter()
            .any(|v| v == "then"));
    }

    #[test]
    fn test_generation_config_serializes_camel_case() {
        let adapter = test_adapter();
        let body = adapter.request_body("p", RecordKind::Plain);
        let json = serde_json::to_value(&body).unwrap();

        assert!(json["generationConfig"]["responseMimeType"].is_string());
        assert!(json["generationConfig"]["maxOutputTokens"].is_number());
    }

    #[test]
    fn test_new_from_config_missing_api_key() {
        let test_env_var = "GEMINI_API_KEY_TEST_MISSING";

        unsafe {
            std::env::remove_var(test_env_var);
        }

        let mut config = Config::minimal_for_testing();
        config.llm.gemini = Some(smartcase_config::GeminiConfig {
            api_key_env: Some(test_env_var.to_string()),
            ..Default::default()
        });

        let result = GeminiAdapter::new_from_config(&config);

        match result {
            Err(AdapterError::Misconfiguration(msg)) => {
                assert!(
                    msg.contains(test_env_var),
                    "Expected error to mention env var, got: {}",
                    msg
                );
            }
            _ => panic!("Expected Misconfiguration error for missing API key"),
        }
    }
}

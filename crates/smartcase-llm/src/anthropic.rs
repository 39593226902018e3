//! Anthropic HTTP adapter
//!
//! This module invokes Anthropic's Messages API in function-calling mode:
//! a single tool whose input schema is the record contract is offered and
//! forced, and records are read from the tool-use input. When a model
//! answers in text anyway, the text is parsed as a fallback.

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

/// Default Anthropic API endpoint
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1/messages";

/// Anthropic API version header value
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Default model when none is configured
const DEFAULT_MODEL: &str = "claude-3-5-haiku-20241022";

/// Name of the forced recording tool
const TOOL_NAME: &str = "record_test_cases";

/// Provider identifier
const PROVIDER_ID: &str = "claude";

/// Anthropic adapter configuration
#[derive(Clone)]
pub(crate) struct AnthropicAdapter {
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

impl AnthropicAdapter {
    /// Create a new Anthropic adapter
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

    /// Create a new Anthropic adapter from configuration
    ///
    /// The API key is read from the configured `api_key_env`, defaulting to
    /// `ANTHROPIC_API_KEY` with `CLAUDE_API_KEY` as a fallback name.
    ///
    /// # Errors
    ///
    /// Returns `AdapterError::Misconfiguration` if:
    /// - No API key environment variable is set
    /// - The HTTP client cannot be constructed
    pub fn new_from_config(config: &Config) -> Result<Self, AdapterError> {
        let api_key = match config
            .llm
            .anthropic
            .as_ref()
            .and_then(|a| a.api_key_env.as_deref())
        {
            Some(env_name) => std::env::var(env_name).map_err(|_| {
                AdapterError::Misconfiguration(format!(
                    "Anthropic API key not found in environment variable '{}'. \
                     Please set this variable or configure a different api_key_env in \
                     [llm.anthropic].",
                    env_name
                ))
            })?,
            None => std::env::var("ANTHROPIC_API_KEY")
                .or_else(|_| std::env::var("CLAUDE_API_KEY"))
                .map_err(|_| {
                    AdapterError::Misconfiguration(
                        "Anthropic API key not found in environment variables \
                         'ANTHROPIC_API_KEY' or 'CLAUDE_API_KEY'. Please set one or configure \
                         api_key_env in [llm.anthropic]."
                            .to_string(),
                    )
                })?,
        };

        let base_url = config
            .llm
            .anthropic
            .as_ref()
            .and_then(|a| a.base_url.clone());

        let model = config
            .llm
            .anthropic
            .as_ref()
            .and_then(|a| a.model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let params = HttpParams {
            max_tokens: config
                .llm
                .anthropic
                .as_ref()
                .and_then(|a| a.max_tokens)
                .unwrap_or(2048),
            temperature: config
                .llm
                .anthropic
                .as_ref()
                .and_then(|a| a.temperature)
                .unwrap_or(0.2),
        };

        Self::new(api_key, base_url, model, params, config.timeout())
    }

    /// Build the request body for one invocation.
    ///
    /// The tool input schema wraps the record array in an `items` object
    /// because tool inputs must be objects.
    fn request_body(&self, prompt: &str, kind: RecordKind) -> AnthropicRequest {
        AnthropicRequest {
            model: self.model.clone(),
            max_tokens: self.params.max_tokens,
            temperature: self.params.temperature,
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            tools: vec![Tool {
                name: TOOL_NAME.to_string(),
                description: "Record the generated test cases.".to_string(),
                input_schema: serde_json::json!({
                    "type": "object",
                    "properties": { "items": batch_schema(kind) },
                    "required": ["items"]
                }),
            }],
            tool_choice: ToolChoice {
                choice_type: "tool".to_string(),
                name: TOOL_NAME.to_string(),
            },
        }
    }

    /// Pull the raw record array out of the response content blocks.
    ///
    /// The forced tool call is the expected path; a text answer is parsed
    /// as a fallback.
    fn records_from_content(content: &[ContentBlock]) -> Result<Vec<Value>, AdapterError> {
        for block in content {
            if block.block_type == "tool_use"
                && let Some(input) = &block.input
            {
                return extract::values_from(input.clone());
            }
        }

        let text: String = content
            .iter()
            .filter(|b| b.block_type == "text")
            .filter_map(|b| b.text.as_deref())
            .collect();

        if text.is_empty() {
            return Err(AdapterError::InvalidResponse(
                "Anthropic response carries neither tool input nor text content".to_string(),
            ));
        }

        extract::extract_records(&text)
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    async fn generate(&self, prompt: &str, kind: RecordKind) -> Result<RecordSet, AdapterError> {
        debug!(
            provider = PROVIDER_ID,
            model = %self.model,
            kind = %kind,
            timeout_secs = self.timeout.as_secs(),
            "Invoking Anthropic adapter"
        );

        let request = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&self.request_body(prompt, kind));

        let response = self.client.execute(request, self.timeout, PROVIDER_ID).await?;

        let response_body: AnthropicResponse = response.json().await.map_err(|e| {
            AdapterError::InvalidResponse(format!("failed to parse Anthropic response: {e}"))
        })?;

        let values = Self::records_from_content(&response_body.content)?;
        let records = validate_records(PROVIDER_ID, kind, values)?;

        debug!(
            provider = PROVIDER_ID,
            records = records.len(),
            "Anthropic invocation completed"
        );

        Ok(records)
    }
}

/// Message for requests
#[derive(Debug, Clone, Serialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

/// Tool definition carrying the record schema
#[derive(Debug, Clone, Serialize)]
struct Tool {
    name: String,
    description: String,
    input_schema: Value,
}

/// Forced tool selection
#[derive(Debug, Clone, Serialize)]
struct ToolChoice {
    #[serde(rename = "type")]
    choice_type: String,
    name: String,
}

/// Messages API request body
#[derive(Debug, Clone, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<AnthropicMessage>,
    tools: Vec<Tool>,
    tool_choice: ToolChoice,
}

/// Messages API response body
#[derive(Debug, Clone, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

/// Content block in a response
#[derive(Debug, Clone, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
    input: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_adapter() -> AnthropicAdapter {
        AnthropicAdapter::new(
            "test-key".to_string(),
            None,
            "test-model".to_string(),
            HttpParams::default(),
            Duration::from_secs(30),
        )
        .unwrap()
    }

    #[test]
    fn test_request_body_forces_tool() {
        let adapter = test_adapter();
        let body = adapter.request_body("generate cases", RecordKind::Plain);

        assert_eq!(body.tools.len(), 1);
        assert_eq!(body.tools[0].name, TOOL_NAME);
        assert_eq!(body.tool_choice.choice_type, "tool");
        assert_eq!(body.tool_choice.name, TOOL_NAME);

        let schema = &body.tools[0].input_schema;
        assert_eq!(schema["properties"]["items"]["type"], "array");
        assert!(schema["properties"]["items"]["items"]["required"]
            .as_array()
            .unwrap()
            .iter()
            .any(|v| v == "steps"));
    }

    #[test]
    fn test_records_from_tool_use_block() {
        let content = vec![ContentBlock {
            block_type: "tool_use".to_string(),
            text: None,
            input: Some(json!({ "items": [{ "id": 1 }, { "id": 2 }] })),
        }];

        let values = AnthropicAdapter::records_from_content(&content).unwrap();
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_records_from_text_fallback() {
        let content = vec![ContentBlock {
            block_type: "text".to_string(),
            text: Some("```json\n[{\"id\": 1}]\n```".to_string()),
            input: None,
        }];

        let values = AnthropicAdapter::records_from_content(&content).unwrap();
        assert_eq!(values.len(), 1);
    }

    #[test]
    fn test_records_prefers_tool_use_over_text() {
        let content = vec![
            ContentBlock {
                block_type: "text".to_string(),
                text: Some("[]".to_string()),
                input: None,
            },
            ContentBlock {
                block_type: "tool_use".to_string(),
                text: None,
                input: Some(json!({ "items": [{ "id": 7 }] })),
            },
        ];

        let values = AnthropicAdapter::records_from_content(&content).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0]["id"], 7);
    }

    #[test]
    fn test_records_from_empty_content_rejected() {
        let result = AnthropicAdapter::records_from_content(&[]);
        assert!(matches!(result, Err(AdapterError::InvalidResponse(_))));
    }

    #[test]
    fn test_new_from_config_missing_api_key() {
        let test_env_var = "ANTHROPIC_API_KEY_TEST_MISSING";

        unsafe {
            std::env::remove_var(test_env_var);
        }

        let mut config = Config::minimal_for_testing();
        config.llm.anthropic = Some(smartcase_config::AnthropicConfig {
            api_key_env: Some(test_env_var.to_string()),
            ..Default::default()
        });

        let result = AnthropicAdapter::new_from_config(&config);

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

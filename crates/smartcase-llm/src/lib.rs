//! LLM provider adapters for multi-provider test case generation
//!
//! This crate provides a trait-based system for invoking hosted LLM backends
//! over HTTP. All providers implement the `ProviderAdapter` trait, allowing
//! the orchestrator to work with any provider without knowing invocation or
//! response-shape details. Each adapter couples the shared record schema to
//! its backend's own structured-output mechanism and hands back validated
//! records only; backend-native shapes never leave this crate.

mod anthropic;
mod extract;
mod gemini;
pub(crate) mod http;
mod openai;
mod types;

pub use smartcase_config as config;
pub use smartcase_utils::error::AdapterError;
pub use types::ProviderAdapter;

// Internal adapter implementations
pub(crate) use anthropic::AnthropicAdapter;
pub(crate) use gemini::GeminiAdapter;
pub(crate) use openai::OpenAiAdapter;

use std::sync::Arc;

use smartcase_config::Config;
use smartcase_schema::{RecordKind, RecordSet, validate_batch};
use tracing::debug;

/// Construct an adapter for a specific provider.
///
/// # Errors
///
/// Returns `AdapterError::Unsupported` if the provider is unknown.
/// Returns `AdapterError::Misconfiguration` if the provider's API key
/// environment variable is missing or the HTTP client cannot be built.
pub fn construct_adapter_for_provider(
    provider: &str,
    config: &Config,
) -> Result<Arc<dyn ProviderAdapter>, AdapterError> {
    match provider {
        "openai" => Ok(Arc::new(OpenAiAdapter::new_from_config(config)?)),
        "gemini" => Ok(Arc::new(GeminiAdapter::new_from_config(config)?)),
        "claude" => Ok(Arc::new(AnthropicAdapter::new_from_config(config)?)),
        unknown => Err(AdapterError::Unsupported(format!(
            "Unknown LLM provider '{}'. Supported providers: claude, gemini, openai.",
            unknown
        ))),
    }
}

/// Turn a decoded raw array into validated records.
///
/// Invalid records are dropped individually; an empty raw array is an empty
/// success. Only an all-rejected non-empty batch escalates to
/// `AdapterError::InvalidResponse`.
pub(crate) fn validate_records(
    provider: &str,
    kind: RecordKind,
    values: Vec<serde_json::Value>,
) -> Result<RecordSet, AdapterError> {
    if values.is_empty() {
        return Ok(RecordSet::empty(kind));
    }

    let outcome = validate_batch(kind, &values);

    if outcome.records.is_empty() {
        let first = outcome
            .rejected
            .first()
            .map(ToString::to_string)
            .unwrap_or_default();
        return Err(AdapterError::InvalidResponse(format!(
            "all {} records failed schema validation ({first})",
            values.len()
        )));
    }

    for violation in &outcome.rejected {
        debug!(provider, %violation, "dropping invalid record");
    }

    Ok(outcome.records)
}

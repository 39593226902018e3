//! Core trait for provider adapters

use async_trait::async_trait;

use smartcase_schema::{RecordKind, RecordSet};
use smartcase_utils::error::AdapterError;

/// Trait for LLM provider adapter implementations.
///
/// All providers implement this trait, allowing the orchestrator to work
/// with any provider without knowing invocation details. An adapter makes
/// exactly one outbound network call per invocation; retry policy, if any,
/// belongs to the caller.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Stable provider identifier (e.g. "openai", "gemini", "claude")
    fn id(&self) -> &str;

    /// Invoke the backend with the shared instruction text and return
    /// validated records of the requested kind.
    ///
    /// Zero validated records is a valid (empty) success, distinct from
    /// failure.
    ///
    /// # Errors
    ///
    /// Returns `AdapterError` for any failure during invocation:
    /// - `Timeout` when the call exceeds its deadline
    /// - `Auth` / `Quota` / `Outage` / `Api` for backend-reported errors
    /// - `InvalidResponse` when no record in a non-empty response survives
    ///   schema validation, or the response cannot be decoded at all
    /// - `Transport` for connectivity failures
    async fn generate(&self, prompt: &str, kind: RecordKind) -> Result<RecordSet, AdapterError>;
}

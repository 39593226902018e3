use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Failure of a single provider adapter invocation.
///
/// Adapters report exactly one of these per call; the orchestrator decides
/// whether a failure is fatal (all providers failed) or becomes a warning
/// (at least one other provider succeeded).
///
/// # Recovery
///
/// | Variant | Orchestrator treatment |
/// |---------|------------------------|
/// | `Timeout` | Dropped, recorded as warning |
/// | `Auth` / `Quota` / `Outage` / `Api` | Dropped, recorded as warning |
/// | `InvalidResponse` | Dropped, recorded as warning |
/// | `Transport` | Dropped, recorded as warning |
/// | `Misconfiguration` | Surfaced at adapter construction time |
/// | `Unsupported` | Mapped to invalid input by the orchestrator |
#[derive(Error, Debug)]
pub enum AdapterError {
    /// Transport-level failure (HTTP connectivity, undecodable body)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Provider authentication failure (401, 403)
    #[error("Provider authentication error: {0}")]
    Auth(String),

    /// Provider quota/rate limit exceeded (429)
    #[error("Provider quota exceeded: {0}")]
    Quota(String),

    /// Provider service outage (5xx errors)
    #[error("Provider outage: {0}")]
    Outage(String),

    /// Other backend-reported request failure (malformed request, 4xx)
    #[error("Provider request error: {0}")]
    Api(String),

    /// Response decoded but no record survived schema validation
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Invocation exceeded its deadline
    #[error("Timeout after {duration:?}")]
    Timeout { duration: Duration },

    /// Adapter could not be constructed (missing API key, bad config)
    #[error("Misconfiguration: {0}")]
    Misconfiguration(String),

    /// Unknown provider name
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

/// One provider's failure, retained for the caller.
///
/// Appears both in the non-fatal warning list of a partially-successful
/// generation and in [`GenerateError::AllProvidersFailed`] when every
/// selected provider failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderFailure {
    /// Provider identifier (e.g. "openai", "gemini", "claude")
    pub provider: String,
    /// Human-readable failure reason
    pub reason: String,
}

impl ProviderFailure {
    #[must_use]
    pub fn new(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.provider, self.reason)
    }
}

/// Terminal failure of a `generate` call.
///
/// Adapter-level failures are caught and converted to warnings unless they
/// exhaust every selected adapter; only then do they surface here.
#[derive(Error, Debug)]
pub enum GenerateError {
    /// Missing/empty story, unsupported format or provider token,
    /// non-positive case count. Never retried.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Every selected provider failed; carries one reason per provider.
    #[error("All providers failed ({})", .failures.len())]
    AllProvidersFailed { failures: Vec<ProviderFailure> },
}

impl GenerateError {
    /// Per-provider reasons for an all-failed outcome, empty otherwise.
    #[must_use]
    pub fn failures(&self) -> &[ProviderFailure] {
        match self {
            Self::AllProvidersFailed { failures } => failures,
            Self::InvalidInput(_) => &[],
        }
    }
}

/// Rejection of a single raw record during schema validation.
///
/// Rejections are per-record: a batch keeps its valid records and drops the
/// rest. An adapter whose every raw record is rejected reports
/// [`AdapterError::InvalidResponse`] instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("record {index}: {reason}")]
pub struct SchemaViolation {
    /// Zero-based position of the record in the raw response array
    pub index: usize,
    /// Which rule failed
    pub reason: String,
}

impl SchemaViolation {
    #[must_use]
    pub fn new(index: usize, reason: impl Into<String>) -> Self {
        Self {
            index,
            reason: reason.into(),
        }
    }
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found at {path}")]
    NotFound { path: String },

    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_error_display() {
        let err = AdapterError::Timeout {
            duration: Duration::from_secs(30),
        };
        assert!(err.to_string().contains("30"));

        let err = AdapterError::Quota("rate limited".to_string());
        assert!(err.to_string().contains("quota"));
        assert!(err.to_string().contains("rate limited"));
    }

    #[test]
    fn test_generate_error_failures_accessor() {
        let err = GenerateError::AllProvidersFailed {
            failures: vec![
                ProviderFailure::new("openai", "timeout"),
                ProviderFailure::new("gemini", "quota"),
            ],
        };
        assert_eq!(err.failures().len(), 2);
        assert_eq!(err.failures()[0].provider, "openai");

        let err = GenerateError::InvalidInput("empty story".to_string());
        assert!(err.failures().is_empty());
    }

    #[test]
    fn test_provider_failure_roundtrip() {
        let failure = ProviderFailure::new("claude", "auth failed");
        let json = serde_json::to_string(&failure).unwrap();
        let back: ProviderFailure = serde_json::from_str(&json).unwrap();
        assert_eq!(failure, back);
    }

    #[test]
    fn test_schema_violation_display() {
        let v = SchemaViolation::new(3, "steps must be a non-empty array");
        assert_eq!(v.to_string(), "record 3: steps must be a non-empty array");
    }
}

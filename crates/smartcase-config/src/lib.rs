//! Configuration for smartcase
//!
//! Configuration is hierarchical: CLI flags override the config file, which
//! overrides built-in defaults. API keys are never stored in the file; each
//! provider table names the environment variable to read
//! (`api_key_env`), defaulting to the provider's conventional variable.
//!
//! ```toml
//! [llm]
//! provider = "all"
//! timeout = 30
//! provider_order = ["claude", "gemini", "openai"]
//!
//! [llm.openai]
//! model = "gpt-4o-mini"
//!
//! [llm.gemini]
//! api_key_env = "GOOGLE_API_KEY"
//!
//! [defaults]
//! num_cases = 5
//! output_dir = "./test_cases"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use smartcase_utils::error::ConfigError;

/// Default per-adapter timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of cases requested when the caller gives no count
pub const DEFAULT_NUM_CASES: u32 = 5;

/// Hard cap on requested cases, enforced at the transport boundary
pub const MAX_NUM_CASES: u32 = 20;

/// Config file name discovered in the working directory
pub const CONFIG_FILE_NAME: &str = "smartcase.toml";

/// All known provider identifiers, in the deterministic "all" order
pub const PROVIDER_IDS: &[&str] = &["claude", "gemini", "openai"];

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub defaults: Defaults,
}

/// LLM provider configuration section
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LlmConfig {
    /// Provider selection: a provider id or "all"
    pub provider: Option<String>,
    /// Per-adapter timeout in seconds
    pub timeout: Option<u64>,
    /// Dispatch order for "all" runs; defaults to alphabetical
    pub provider_order: Option<Vec<String>>,
    pub openai: Option<OpenAiConfig>,
    pub gemini: Option<GeminiConfig>,
    pub anthropic: Option<AnthropicConfig>,
}

/// OpenAI provider settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OpenAiConfig {
    pub base_url: Option<String>,
    pub api_key_env: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// Google Gemini provider settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GeminiConfig {
    pub base_url: Option<String>,
    pub api_key_env: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// Anthropic provider settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AnthropicConfig {
    pub base_url: Option<String>,
    pub api_key_env: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// Generation defaults section
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Defaults {
    pub num_cases: Option<u32>,
    pub output_dir: Option<String>,
    pub filename_prefix: Option<String>,
}

impl Config {
    /// Load configuration.
    ///
    /// With an explicit path the file must exist and parse. Without one,
    /// `smartcase.toml` in the current directory is used when present,
    /// otherwise built-in defaults apply.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` for a missing explicit path and
    /// `ConfigError::InvalidFile` for unparseable TOML.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound {
                        path: path.display().to_string(),
                    });
                }
                Self::from_file(path)
            }
            None => {
                let discovered = Path::new(CONFIG_FILE_NAME);
                if discovered.exists() {
                    Self::from_file(discovered)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::InvalidFile(format!("{}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| ConfigError::InvalidFile(format!("{}: {e}", path.display())))
    }

    /// Minimal configuration for tests: no provider tables, default timing.
    #[must_use]
    pub fn minimal_for_testing() -> Self {
        Self::default()
    }

    /// Per-adapter timeout as a duration
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.llm.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Dispatch order for "all" runs.
    ///
    /// The configured `provider_order` wins when present; the default is
    /// alphabetical by provider identifier so output grouping is
    /// reproducible.
    #[must_use]
    pub fn provider_order(&self) -> Vec<String> {
        match &self.llm.provider_order {
            Some(order) => order.clone(),
            None => PROVIDER_IDS.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Default number of cases when the caller gives no count
    #[must_use]
    pub fn num_cases(&self) -> u32 {
        self.defaults.num_cases.unwrap_or(DEFAULT_NUM_CASES)
    }

    /// Output directory for exported markdown files
    #[must_use]
    pub fn output_dir(&self) -> &str {
        self.defaults.output_dir.as_deref().unwrap_or("./test_cases")
    }

    /// Filename prefix for exported markdown files
    #[must_use]
    pub fn filename_prefix(&self) -> &str {
        self.defaults
            .filename_prefix
            .as_deref()
            .unwrap_or("generated_tests")
    }
}

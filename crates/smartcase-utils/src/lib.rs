//! Shared infrastructure for smartcase
//!
//! This crate holds the error taxonomy used across the generation pipeline
//! and the tracing bootstrap used by binaries. Library crates return typed
//! errors from here; only the CLI boundary converts them to exit codes.

pub mod error;
pub mod logging;

pub use error::{AdapterError, ConfigError, GenerateError, ProviderFailure, SchemaViolation};

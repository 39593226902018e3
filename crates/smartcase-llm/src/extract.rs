//! JSON extraction from model response text
//!
//! Backends asked for a JSON array sometimes fence it in markdown or wrap it
//! in an `{"items": [...]}` object anyway. Extraction normalizes both shapes
//! before validation; anything else is an invalid response.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use smartcase_utils::error::AdapterError;

static FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").unwrap());

/// Extract the raw record array from response text.
///
/// # Errors
///
/// Returns `AdapterError::InvalidResponse` when the text holds no parseable
/// JSON or the parsed value is neither an array nor an `items`-wrapped array.
pub(crate) fn extract_records(raw: &str) -> Result<Vec<Value>, AdapterError> {
    let candidate = FENCE_RE
        .captures(raw)
        .and_then(|c| c.get(1))
        .map_or_else(|| raw.trim(), |m| m.as_str());

    let value: Value = serde_json::from_str(candidate)
        .map_err(|e| AdapterError::InvalidResponse(format!("response is not JSON: {e}")))?;

    values_from(value)
}

/// Accept a bare array or the `{"items": [...]}` wrapper some models emit.
pub(crate) fn values_from(value: Value) -> Result<Vec<Value>, AdapterError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(AdapterError::InvalidResponse(
                "expected a JSON array of records".to_string(),
            )),
        },
        _ => Err(AdapterError::InvalidResponse(
            "expected a JSON array of records".to_string(),
        )),
    }
}

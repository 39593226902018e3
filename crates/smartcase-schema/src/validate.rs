//! Runtime schema validation for raw provider output
//!
//! Providers return heterogeneous JSON; this module enforces the common
//! structural contract on each decoded record. Validation has no
//! provider-specific logic and is applied identically to every adapter's
//! output.

use serde_json::{Value, json};

use crate::types::{BddScenario, PlainTestCase, RecordKind, RecordSet};
use smartcase_utils::error::SchemaViolation;

/// Result of validating one raw batch: the surviving records plus one
/// violation per dropped record.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub records: RecordSet,
    pub rejected: Vec<SchemaViolation>,
}

/// Validate a decoded array of raw records against the target kind.
///
/// Records are accepted or rejected individually; ordering of accepted
/// records follows the input. An empty input yields an empty success.
#[must_use]
pub fn validate_batch(kind: RecordKind, values: &[Value]) -> BatchOutcome {
    let mut rejected = Vec::new();

    let records = match kind {
        RecordKind::Plain => {
            let mut accepted = Vec::new();
            for (index, value) in values.iter().enumerate() {
                match validate_plain(index, value) {
                    Ok(record) => accepted.push(record),
                    Err(violation) => rejected.push(violation),
                }
            }
            RecordSet::Plain(accepted)
        }
        RecordKind::Bdd => {
            let mut accepted = Vec::new();
            for (index, value) in values.iter().enumerate() {
                match validate_bdd(index, value) {
                    Ok(record) => accepted.push(record),
                    Err(violation) => rejected.push(violation),
                }
            }
            RecordSet::Bdd(accepted)
        }
    };

    BatchOutcome { records, rejected }
}

fn validate_plain(index: usize, value: &Value) -> Result<PlainTestCase, SchemaViolation> {
    let record: PlainTestCase = serde_json::from_value(value.clone())
        .map_err(|e| SchemaViolation::new(index, e.to_string()))?;

    if record.id == 0 {
        return Err(SchemaViolation::new(index, "id must be a positive integer"));
    }
    require_non_empty(index, "title", &record.title)?;
    require_non_empty(index, "description", &record.description)?;
    require_non_empty(index, "expected", &record.expected)?;
    require_non_empty_list(index, "steps", &record.steps)?;

    Ok(record)
}

fn validate_bdd(index: usize, value: &Value) -> Result<BddScenario, SchemaViolation> {
    let record: BddScenario = serde_json::from_value(value.clone())
        .map_err(|e| SchemaViolation::new(index, e.to_string()))?;

    require_non_empty(index, "feature", &record.feature)?;
    require_non_empty(index, "scenario", &record.scenario)?;
    require_non_empty_list(index, "given", &record.given)?;
    require_non_empty_list(index, "when", &record.when)?;
    require_non_empty_list(index, "then", &record.then)?;

    Ok(record)
}

fn require_non_empty(index: usize, field: &str, value: &str) -> Result<(), SchemaViolation> {
    if value.trim().is_empty() {
        return Err(SchemaViolation::new(
            index,
            format!("{field} must be a non-empty string"),
        ));
    }
    Ok(())
}

fn require_non_empty_list(
    index: usize,
    field: &str,
    values: &[String],
) -> Result<(), SchemaViolation> {
    if values.is_empty() {
        return Err(SchemaViolation::new(
            index,
            format!("{field} must contain at least one entry"),
        ));
    }
    if values.iter().any(|v| v.trim().is_empty()) {
        return Err(SchemaViolation::new(
            index,
            format!("{field} entries must be non-empty strings"),
        ));
    }
    Ok(())
}

/// JSON Schema for a single record of the given kind.
///
/// This is the contract each adapter couples to its backend's
/// structured-output mechanism; field descriptions double as model guidance.
#[must_use]
pub fn record_schema(kind: RecordKind) -> Value {
    match kind {
        RecordKind::Plain => json!({
            "type": "object",
            "properties": {
                "id": { "type": "integer", "description": "Unique test case ID" },
                "title": { "type": "string", "description": "Test case title" },
                "description": { "type": "string", "description": "Detailed description" },
                "preconditions": { "type": "string", "description": "Prerequisites or setup" },
                "steps": {
                    "type": "array",
                    "items": { "type": "string" },
                    "minItems": 1,
                    "description": "Step-by-step instructions"
                },
                "expected": { "type": "string", "description": "Expected outcome" },
                "type": { "type": "string", "description": "Type: positive, negative, edge, etc." }
            },
            "required": ["id", "title", "description", "steps", "expected", "type"]
        }),
        RecordKind::Bdd => json!({
            "type": "object",
            "properties": {
                "feature": { "type": "string", "description": "Feature name" },
                "scenario": { "type": "string", "description": "Scenario title" },
                "given": {
                    "type": "array",
                    "items": { "type": "string" },
                    "minItems": 1,
                    "description": "Given steps (preconditions)"
                },
                "when": {
                    "type": "array",
                    "items": { "type": "string" },
                    "minItems": 1,
                    "description": "When steps (actions)"
                },
                "then": {
                    "type": "array",
                    "items": { "type": "string" },
                    "minItems": 1,
                    "description": "Then steps (expectations)"
                }
            },
            "required": ["feature", "scenario", "given", "when", "then"]
        }),
    }
}

/// JSON Schema for the full response: an array of records.
#[must_use]
pub fn batch_schema(kind: RecordKind) -> Value {
    json!({
        "type": "array",
        "items": record_schema(kind)
    })
}

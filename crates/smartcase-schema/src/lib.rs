//! Record types and schema validation for generated test cases
//!
//! The two record kinds (plain-English test cases and BDD scenarios) share a
//! single structural contract regardless of which provider produced them.
//! Validation is runtime and per-record: a record failing any rule is
//! rejected as a unit, never patched.

mod types;
mod validate;

pub use types::{BddScenario, PlainTestCase, RecordKind, RecordSet};
pub use validate::{BatchOutcome, batch_schema, record_schema, validate_batch};

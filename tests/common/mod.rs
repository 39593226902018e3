//! Shared test support: canned provider adapters
//!
//! Integration tests drive the orchestrator with fake adapters injected via
//! `Generator::with_adapters`, so no network access is needed.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::Arc;

use smartcase::{AdapterError, BddScenario, PlainTestCase, ProviderAdapter, RecordKind, RecordSet};

/// Adapter returning a fixed outcome for every invocation
pub struct CannedAdapter {
    id: String,
    outcome: Result<RecordSet, CannedFailure>,
}

#[derive(Clone)]
pub enum CannedFailure {
    Api(String),
    Timeout,
}

impl CannedAdapter {
    pub fn succeeding(id: &str, records: RecordSet) -> Arc<dyn ProviderAdapter> {
        Arc::new(Self {
            id: id.to_string(),
            outcome: Ok(records),
        })
    }

    pub fn failing(id: &str, reason: &str) -> Arc<dyn ProviderAdapter> {
        Arc::new(Self {
            id: id.to_string(),
            outcome: Err(CannedFailure::Api(reason.to_string())),
        })
    }

    pub fn timing_out(id: &str) -> Arc<dyn ProviderAdapter> {
        Arc::new(Self {
            id: id.to_string(),
            outcome: Err(CannedFailure::Timeout),
        })
    }
}

#[async_trait]
impl ProviderAdapter for CannedAdapter {
    fn id(&self) -> &str {
        &self.id
    }

    async fn generate(&self, _prompt: &str, _kind: RecordKind) -> Result<RecordSet, AdapterError> {
        match &self.outcome {
            Ok(records) => Ok(records.clone()),
            Err(CannedFailure::Api(reason)) => Err(AdapterError::Api(reason.clone())),
            Err(CannedFailure::Timeout) => Err(AdapterError::Timeout {
                duration: std::time::Duration::from_secs(30),
            }),
        }
    }
}

/// Build `count` plain test cases with ids starting at 1, unlabeled
pub fn plain_cases(count: usize) -> RecordSet {
    RecordSet::Plain(
        (1..=count)
            .map(|i| PlainTestCase {
                id: i as u32,
                title: format!("Test case {i}"),
                description: format!("Validates behavior {i}"),
                preconditions: (i % 2 == 0).then(|| "User account exists".to_string()),
                steps: vec![format!("Perform action {i}"), "Observe result".to_string()],
                expected: "System behaves as specified".to_string(),
                case_type: "positive".to_string(),
                provider: None,
            })
            .collect(),
    )
}

/// Build `count` BDD scenarios, unlabeled
pub fn bdd_scenarios(count: usize) -> RecordSet {
    RecordSet::Bdd(
        (1..=count)
            .map(|i| BddScenario {
                feature: "Account access".to_string(),
                scenario: format!("Scenario {i}"),
                given: vec!["a registered user".to_string()],
                when: vec![format!("action {i} is performed")],
                then: vec!["the expected outcome is observed".to_string()],
                provider: None,
            })
            .collect(),
    )
}

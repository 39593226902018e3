//! Markdown rendering of validated record sequences
//!
//! Rendering is pure and deterministic: the timestamp comes in with the
//! metadata, so rendering the same records twice produces identical
//! documents. The provider line collapses to a single label when every
//! record shares one provider; mixed sequences get a `multiple` line and
//! per-record provider tags.

use chrono::{DateTime, Utc};

use smartcase_schema::{BddScenario, PlainTestCase, RecordSet};

/// Generation metadata rendered into document headers
#[derive(Debug, Clone)]
pub struct RenderMeta {
    pub generated_at: DateTime<Utc>,
    pub story: String,
}

impl RenderMeta {
    #[must_use]
    pub fn new(generated_at: DateTime<Utc>, story: impl Into<String>) -> Self {
        Self {
            generated_at,
            story: story.into(),
        }
    }

    fn timestamp(&self) -> String {
        self.generated_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Render a record set to its document format.
#[must_use]
pub fn render(records: &RecordSet, meta: &RenderMeta) -> String {
    match records {
        RecordSet::Plain(records) => render_plain(records, meta),
        RecordSet::Bdd(records) => render_bdd(records, meta),
    }
}

/// Render plain-English test cases to a markdown document.
#[must_use]
pub fn render_plain(records: &[PlainTestCase], meta: &RenderMeta) -> String {
    let providers = distinct_providers(records.iter().map(|r| r.provider.as_deref()));
    let mixed = providers.len() > 1;

    let mut md = String::new();
    md.push_str("# Test Cases - Plain English Format\n\n");
    md.push_str(&format!("**Generated on:** {}\n\n", meta.timestamp()));
    md.push_str(&format!("**Provider:** {}\n\n", provider_line(&providers)));
    md.push_str(&format!("**User Story:** {}\n\n---\n\n", meta.story));

    for record in records {
        md.push_str(&format!("## Test Case {}: {}\n\n", record.id, record.title));
        md.push_str(&format!("**Description:** {}\n\n", record.description));
        md.push_str(&format!("**Type:** {}\n\n", record.case_type));
        if mixed && let Some(provider) = &record.provider {
            md.push_str(&format!("**Provider:** {provider}\n\n"));
        }
        if let Some(preconditions) = &record.preconditions {
            md.push_str(&format!("**Preconditions:** {preconditions}\n\n"));
        }
        md.push_str("**Steps:**\n");
        for (step_num, step) in record.steps.iter().enumerate() {
            md.push_str(&format!("{}. {step}\n", step_num + 1));
        }
        md.push_str(&format!("\n**Expected Result:** {}\n\n---\n\n", record.expected));
    }

    md
}

/// Render BDD scenarios to a markdown document with fenced Gherkin blocks.
#[must_use]
pub fn render_bdd(records: &[BddScenario], meta: &RenderMeta) -> String {
    let providers = distinct_providers(records.iter().map(|r| r.provider.as_deref()));
    let mixed = providers.len() > 1;

    let mut md = String::new();
    md.push_str("# BDD Test Scenarios - Gherkin Format\n\n");
    md.push_str(&format!("**Generated on:** {}\n\n", meta.timestamp()));
    md.push_str(&format!("**Provider:** {}\n\n", provider_line(&providers)));
    md.push_str(&format!("**User Story:** {}\n\n---\n\n", meta.story));

    for (i, record) in records.iter().enumerate() {
        md.push_str(&format!("## Scenario {}: {}\n\n", i + 1, record.scenario));
        md.push_str(&format!("**Feature:** {}\n\n", record.feature));
        if mixed && let Some(provider) = &record.provider {
            md.push_str(&format!("**Provider:** {provider}\n\n"));
        }
        md.push_str("```gherkin\n");
        md.push_str(&format!("Feature: {}\n\n", record.feature));
        md.push_str(&format!("Scenario: {}\n", record.scenario));
        for given in &record.given {
            md.push_str(&format!("  Given {given}\n"));
        }
        for when in &record.when {
            md.push_str(&format!("  When {when}\n"));
        }
        for then in &record.then {
            md.push_str(&format!("  Then {then}\n"));
        }
        md.push_str("```\n\n---\n\n");
    }

    md
}

fn distinct_providers<'a>(providers: impl Iterator<Item = Option<&'a str>>) -> Vec<&'a str> {
    let mut seen: Vec<&str> = Vec::new();
    for provider in providers.flatten() {
        if !seen.contains(&provider) {
            seen.push(provider);
        }
    }
    seen
}

fn provider_line(providers: &[&str]) -> String {
    match providers {
        [] => "unknown".to_string(),
        [single] => (*single).to_string(),
        _ => "multiple".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn meta() -> RenderMeta {
        RenderMeta::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap(),
            "As a user, I want to log in so that I can access my account.",
        )
    }

    fn plain_case(id: u32, provider: &str) -> PlainTestCase {
        PlainTestCase {
            id,
            title: format!("Case {id}"),
            description: "Verify login".to_string(),
            preconditions: Some("Account exists".to_string()),
            steps: vec!["Open page".to_string(), "Submit form".to_string()],
            expected: "Dashboard shown".to_string(),
            case_type: "positive".to_string(),
            provider: Some(provider.to_string()),
        }
    }

    fn bdd_case(scenario: &str, provider: &str) -> BddScenario {
        BddScenario {
            feature: "Login".to_string(),
            scenario: scenario.to_string(),
            given: vec!["an existing account".to_string()],
            when: vec!["the user submits valid credentials".to_string()],
            then: vec!["the dashboard is shown".to_string()],
            provider: Some(provider.to_string()),
        }
    }

    #[test]
    fn test_plain_document_structure() {
        let records = vec![plain_case(1, "openai"), plain_case(2, "openai")];
        let md = render_plain(&records, &meta());

        assert!(md.starts_with("# Test Cases - Plain English Format\n"));
        assert!(md.contains("**Generated on:** 2024-06-01 12:30:00"));
        assert!(md.contains("**Provider:** openai"));
        assert!(md.contains("**User Story:** As a user, I want to log in"));
        assert!(md.contains("## Test Case 1: Case 1"));
        assert!(md.contains("## Test Case 2: Case 2"));
        assert!(md.contains("**Preconditions:** Account exists"));
        assert!(md.contains("1. Open page\n2. Submit form\n"));
        assert!(md.contains("**Expected Result:** Dashboard shown"));
    }

    #[test]
    fn test_plain_single_provider_has_no_per_record_tags() {
        let records = vec![plain_case(1, "openai"), plain_case(2, "openai")];
        let md = render_plain(&records, &meta());

        // Exactly one provider line: the header
        assert_eq!(md.matches("**Provider:**").count(), 1);
    }

    #[test]
    fn test_plain_mixed_providers_render_per_record() {
        let records = vec![plain_case(1, "claude"), plain_case(2, "openai")];
        let md = render_plain(&records, &meta());

        assert!(md.contains("**Provider:** multiple"));
        assert!(md.contains("**Provider:** claude"));
        assert!(md.contains("**Provider:** openai"));
    }

    #[test]
    fn test_plain_preconditions_omitted_when_absent() {
        let mut record = plain_case(1, "openai");
        record.preconditions = None;
        let md = render_plain(&[record], &meta());

        assert!(!md.contains("**Preconditions:**"));
    }

    #[test]
    fn test_bdd_document_structure() {
        let records = vec![bdd_case("Valid login", "gemini")];
        let md = render_bdd(&records, &meta());

        assert!(md.starts_with("# BDD Test Scenarios - Gherkin Format\n"));
        assert!(md.contains("**Provider:** gemini"));
        assert!(md.contains("## Scenario 1: Valid login"));
        assert!(md.contains("**Feature:** Login"));
        assert!(md.contains("```gherkin\n"));
        assert!(md.contains("Feature: Login\n"));
        assert!(md.contains("Scenario: Valid login\n"));
        assert!(md.contains("  Given an existing account\n"));
        assert!(md.contains("  When the user submits valid credentials\n"));
        assert!(md.contains("  Then the dashboard is shown\n"));
    }

    #[test]
    fn test_bdd_gherkin_line_order() {
        let mut record = bdd_case("Ordering", "gemini");
        record.given = vec!["first".to_string(), "second".to_string()];
        record.then = vec!["outcome one".to_string(), "outcome two".to_string()];
        let md = render_bdd(&[record], &meta());

        let given_first = md.find("  Given first").unwrap();
        let given_second = md.find("  Given second").unwrap();
        let when_pos = md.find("  When ").unwrap();
        let then_one = md.find("  Then outcome one").unwrap();
        let then_two = md.find("  Then outcome two").unwrap();

        assert!(given_first < given_second);
        assert!(given_second < when_pos);
        assert!(when_pos < then_one);
        assert!(then_one < then_two);
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let records = vec![plain_case(1, "claude"), plain_case(2, "openai")];
        let m = meta();
        assert_eq!(render_plain(&records, &m), render_plain(&records, &m));

        let scenarios = vec![bdd_case("A", "claude"), bdd_case("B", "openai")];
        assert_eq!(render_bdd(&scenarios, &m), render_bdd(&scenarios, &m));
    }

    #[test]
    fn test_render_dispatches_on_kind() {
        let set = RecordSet::Plain(vec![plain_case(1, "openai")]);
        assert!(render(&set, &meta()).starts_with("# Test Cases"));

        let set = RecordSet::Bdd(vec![bdd_case("A", "openai")]);
        assert!(render(&set, &meta()).starts_with("# BDD Test Scenarios"));
    }

    #[test]
    fn test_unlabeled_records_render_unknown_provider() {
        let mut record = plain_case(1, "x");
        record.provider = None;
        let md = render_plain(&[record], &meta());
        assert!(md.contains("**Provider:** unknown"));
    }
}

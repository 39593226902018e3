//! Prompt assembly for test case generation
//!
//! One instruction text is built per `generate` call and shared verbatim by
//! every provider adapter in that call. The builder is pure: no network or
//! file I/O, and the same inputs always produce the same text.

use smartcase_schema::{RecordKind, record_schema};
use smartcase_utils::error::GenerateError;

use serde::{Deserialize, Serialize};

/// A pre-extracted supporting-context block.
///
/// Extraction (OCR, PDF/Office parsing) happens outside the core; by the time
/// a block reaches the prompt builder it is plain text plus the filename it
/// came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextBlock {
    pub filename: String,
    pub text: String,
}

impl ContextBlock {
    #[must_use]
    pub fn new(filename: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            text: text.into(),
        }
    }
}

/// Build the instruction text for one generation request.
///
/// The text states the desired output format, embeds the user story
/// verbatim, appends each supporting-context block labeled with its
/// originating filename, and states the exact record schema the model must
/// follow.
///
/// # Errors
///
/// Returns `GenerateError::InvalidInput` if the story is empty or
/// whitespace-only. All other inputs are accepted as-is.
pub fn build_prompt(
    story: &str,
    kind: RecordKind,
    case_count: Option<u32>,
    context: &[ContextBlock],
) -> Result<String, GenerateError> {
    if story.trim().is_empty() {
        return Err(GenerateError::InvalidInput(
            "user story must not be empty".to_string(),
        ));
    }

    let count_phrase = match case_count {
        Some(n) => format!("exactly {n}"),
        None => "5-10".to_string(),
    };

    let mut prompt = String::new();

    match kind {
        RecordKind::Plain => {
            prompt.push_str("You are an expert QA engineer.\n\n");
            prompt.push_str(&format!(
                "From the user story below, generate {count_phrase} comprehensive test cases \
                 in plain English, covering positive, negative, edge, and boundary scenarios. \
                 Include prerequisites, instructions, and expected criteria where relevant.\n\n"
            ));
        }
        RecordKind::Bdd => {
            prompt.push_str("You are an expert QA engineer skilled in BDD.\n\n");
            prompt.push_str(&format!(
                "From the user story below, generate {count_phrase} BDD scenarios in Gherkin \
                 format, covering positive, negative, edge, and boundary cases. Put \
                 prerequisites in 'Given', actions in 'When', expectations in 'Then'.\n\n"
            ));
        }
    }

    prompt.push_str("User story:\n\"\"\"\n");
    prompt.push_str(story);
    prompt.push_str("\n\"\"\"\n");

    for block in context {
        prompt.push_str(&format!("\nSupporting file: {}\n\"\"\"\n", block.filename));
        prompt.push_str(block.text.trim_end());
        prompt.push_str("\n\"\"\"\n");
    }

    let schema = serde_json::to_string_pretty(&record_schema(kind))
        .unwrap_or_else(|_| record_schema(kind).to_string());

    prompt.push_str(&format!(
        "\nEach {} must be a JSON object conforming to this schema:\n{schema}\n",
        match kind {
            RecordKind::Plain => "test case",
            RecordKind::Bdd => "scenario",
        }
    ));
    prompt.push_str(
        "\nIMPORTANT: Return ONLY a JSON array of these objects, not an object with an \
         \"items\" key. Do not include surrounding prose.\n",
    );

    Ok(prompt)
}

//! smartcase - Multi-provider LLM test case generation
//!
//! This crate generates software test cases (plain English and BDD/Gherkin)
//! from a natural-language user story by prompting one or several hosted LLM
//! providers, validating the returned structured data against a common
//! schema, and exporting it to markdown.
//!
//! smartcase can be used in two ways:
//! - **CLI**: Install via `cargo install smartcase` and run from command line
//! - **Library**: Add as a dependency and drive the orchestrator directly
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! export OPENAI_API_KEY=sk-...
//!
//! # Generate both formats from a story
//! smartcase --story "As a user, I want to log in..." --format both
//!
//! # Fan out to every configured provider and combine the results
//! smartcase --story-file story.txt --provider all --num-cases 10
//! ```
//!
//! # Quick Start (Library)
//!
//! ```no_run
//! use smartcase::{GenerateRequest, Generator, ProviderSelection, RecordKind};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = smartcase::config::Config::load(None)?;
//! let generator = Generator::from_config(config);
//!
//! let output = generator
//!     .generate(GenerateRequest::new(
//!         "As a user, I want to log in so that I can access my account.",
//!         RecordKind::Plain,
//!         ProviderSelection::All,
//!     ))
//!     .await?;
//!
//! for warning in &output.warnings {
//!     eprintln!("provider {} failed: {}", warning.provider, warning.reason);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;

pub use smartcase_config as config;
pub use smartcase_engine::{GenerateOutput, GenerateRequest, Generator, ProviderSelection};
pub use smartcase_llm::{AdapterError, ProviderAdapter};
pub use smartcase_prompt::{ContextBlock, build_prompt};
pub use smartcase_render::{RenderMeta, render, render_bdd, render_plain};
pub use smartcase_schema::{
    BatchOutcome, BddScenario, PlainTestCase, RecordKind, RecordSet, batch_schema, record_schema,
    validate_batch,
};
pub use smartcase_utils::error::{GenerateError, ProviderFailure};
pub use smartcase_utils::logging;

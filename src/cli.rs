//! Command-line interface for smartcase
//!
//! The CLI is a thin transport layer: it gathers the five generation inputs
//! from flags and files, drives the orchestrator, and writes the rendered
//! markdown documents to disk. All generation logic lives in the library
//! crates.

use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

use chrono::Utc;
use smartcase_config::{Config, MAX_NUM_CASES};
use smartcase_engine::{GenerateRequest, Generator, ProviderSelection};
use smartcase_prompt::ContextBlock;
use smartcase_render::{RenderMeta, render};
use smartcase_schema::RecordKind;
use smartcase_utils::error::GenerateError;

/// Process exit codes for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Invalid input or configuration
    Usage,
    /// Every selected provider failed
    AllProvidersFailed,
    /// Internal failure (runtime construction, I/O)
    Internal,
}

impl ExitCode {
    #[must_use]
    pub const fn as_i32(&self) -> i32 {
        match self {
            Self::Usage => 2,
            Self::AllProvidersFailed => 70,
            Self::Internal => 1,
        }
    }
}

/// Requested output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Plain,
    Bdd,
    Both,
}

impl FormatArg {
    /// The record kinds this format expands to, in generation order
    fn kinds(&self) -> Vec<RecordKind> {
        match self {
            Self::Plain => vec![RecordKind::Plain],
            Self::Bdd => vec![RecordKind::Bdd],
            Self::Both => vec![RecordKind::Plain, RecordKind::Bdd],
        }
    }
}

/// Generate test cases from user stories using hosted LLM providers
#[derive(Debug, Parser)]
#[command(name = "smartcase", version, about)]
pub struct Cli {
    /// User story text directly as argument
    #[arg(long, short = 's', conflicts_with = "story_file")]
    pub story: Option<String>,

    /// Path to file containing the user story
    #[arg(long, short = 'f')]
    pub story_file: Option<PathBuf>,

    /// Output format for test cases
    #[arg(long, value_enum, default_value_t = FormatArg::Both)]
    pub format: FormatArg,

    /// LLM provider to use (claude, gemini, openai, or "all")
    #[arg(long)]
    pub provider: Option<String>,

    /// Number of test cases to generate
    #[arg(long, short = 'n')]
    pub num_cases: Option<u32>,

    /// Directory to save generated files
    #[arg(long, short = 'o')]
    pub output_dir: Option<PathBuf>,

    /// Filename prefix for generated files
    #[arg(long, short = 'p')]
    pub prefix: Option<String>,

    /// Supporting context file, appended to the prompt (repeatable)
    #[arg(long = "context-file")]
    pub context_files: Vec<PathBuf>,

    /// Path to a smartcase.toml configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Suppress output except errors and file paths
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Verbose logging
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

/// Main CLI execution function.
///
/// Handles all output including errors; main.rs only maps the returned code
/// to a process exit.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    if let Err(e) = smartcase_utils::logging::init_tracing(cli.verbose) {
        eprintln!("Warning: failed to initialize logging: {e}");
    }

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Configuration error: {err}");
            return Err(ExitCode::Usage);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return Err(ExitCode::Internal);
        }
    };

    rt.block_on(execute(cli, config))
}

async fn execute(cli: Cli, config: Config) -> Result<(), ExitCode> {
    let story = resolve_story(&cli)?;

    let provider_token = cli
        .provider
        .clone()
        .or_else(|| config.llm.provider.clone())
        .unwrap_or_else(|| "openai".to_string());
    let selection = ProviderSelection::parse(&provider_token);

    let num_cases = cli.num_cases.unwrap_or_else(|| config.num_cases());
    let num_cases = if num_cases > MAX_NUM_CASES {
        eprintln!("Warning: --num-cases capped at {MAX_NUM_CASES} (requested {num_cases})");
        MAX_NUM_CASES
    } else {
        num_cases
    };

    let context = load_context_files(&cli.context_files)?;

    let output_dir = cli
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(config.output_dir()));
    let prefix = cli
        .prefix
        .clone()
        .unwrap_or_else(|| config.filename_prefix().to_string());

    if !cli.quiet {
        println!("smartcase: AI-powered test case generation");
        let preview: String = story.chars().take(100).collect();
        let ellipsis = if story.chars().count() > 100 { "..." } else { "" };
        println!("User story: {preview}{ellipsis}");
        println!("Provider: {provider_token}");
        println!("Cases: {num_cases}");
        println!("Output directory: {}", output_dir.display());
    }

    let generator = Generator::from_config(config);
    let generated_at = Utc::now();
    let meta = RenderMeta::new(generated_at, story.clone());
    let timestamp = generated_at.format("%Y%m%d_%H%M%S");

    for kind in cli.format.kinds() {
        let request = GenerateRequest::new(story.clone(), kind, selection.clone())
            .with_case_count(num_cases)
            .with_context(context.clone());

        let output = match generator.generate(request).await {
            Ok(output) => output,
            Err(err) => {
                report_generate_error(&err);
                return Err(match err {
                    GenerateError::InvalidInput(_) => ExitCode::Usage,
                    GenerateError::AllProvidersFailed { .. } => ExitCode::AllProvidersFailed,
                });
            }
        };

        for warning in &output.warnings {
            eprintln!("Warning: provider {} failed: {}", warning.provider, warning.reason);
        }

        let document = render(&output.records, &meta);
        let filename = format!("{prefix}_{}_{timestamp}.md", kind.as_str());
        let path = output_dir.join(filename);
        write_document(&path, &document)?;

        if cli.quiet {
            println!("{}", path.display());
        } else {
            println!(
                "Generated {} {} record(s): {}",
                output.records.len(),
                kind,
                path.display()
            );
        }
    }

    Ok(())
}

fn resolve_story(cli: &Cli) -> Result<String, ExitCode> {
    if let Some(story) = &cli.story {
        return Ok(story.trim().to_string());
    }

    if let Some(path) = &cli.story_file {
        let content = std::fs::read_to_string(path).map_err(|e| {
            eprintln!("Failed to read story file {}: {e}", path.display());
            ExitCode::Usage
        })?;
        let content = content.trim().to_string();
        if content.is_empty() {
            eprintln!("Story file is empty: {}", path.display());
            return Err(ExitCode::Usage);
        }
        return Ok(content);
    }

    eprintln!("No user story provided. Use --story or --story-file.");
    Err(ExitCode::Usage)
}

fn load_context_files(paths: &[PathBuf]) -> Result<Vec<ContextBlock>, ExitCode> {
    let mut blocks = Vec::with_capacity(paths.len());
    for path in paths {
        let text = std::fs::read_to_string(path).map_err(|e| {
            eprintln!("Failed to read context file {}: {e}", path.display());
            ExitCode::Usage
        })?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        blocks.push(ContextBlock::new(filename, text));
    }
    Ok(blocks)
}

fn write_document(path: &Path, document: &str) -> Result<(), ExitCode> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            eprintln!("Failed to create output directory {}: {e}", parent.display());
            ExitCode::Internal
        })?;
    }
    std::fs::write(path, document).map_err(|e| {
        eprintln!("Failed to write {}: {e}", path.display());
        ExitCode::Internal
    })
}

fn report_generate_error(err: &GenerateError) {
    match err {
        GenerateError::InvalidInput(msg) => eprintln!("Invalid input: {msg}"),
        GenerateError::AllProvidersFailed { failures } => {
            eprintln!("All providers failed:");
            for failure in failures {
                eprintln!("  {}: {}", failure.provider, failure.reason);
            }
            eprintln!("Verify your API keys and provider status, then try again.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_format_kinds() {
        assert_eq!(FormatArg::Plain.kinds(), vec![RecordKind::Plain]);
        assert_eq!(FormatArg::Bdd.kinds(), vec![RecordKind::Bdd]);
        assert_eq!(
            FormatArg::Both.kinds(),
            vec![RecordKind::Plain, RecordKind::Bdd]
        );
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitCode::Usage.as_i32(), 2);
        assert_eq!(ExitCode::AllProvidersFailed.as_i32(), 70);
        assert_eq!(ExitCode::Internal.as_i32(), 1);
    }

    #[test]
    fn test_story_flag_conflicts_with_file() {
        let result =
            Cli::try_parse_from(["smartcase", "--story", "s", "--story-file", "f.txt"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_minimal_invocation() {
        let cli = Cli::try_parse_from(["smartcase", "--story", "As a user..."]).unwrap();
        assert_eq!(cli.story.as_deref(), Some("As a user..."));
        assert_eq!(cli.format, FormatArg::Both);
        assert!(cli.provider.is_none());
    }
}

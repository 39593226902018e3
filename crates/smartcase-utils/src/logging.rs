//! Logging bootstrap for smartcase binaries
//!
//! Library crates emit `tracing` events; binaries call [`init_tracing`] once
//! at startup to install a subscriber.

use std::io::IsTerminal;
use tracing_subscriber::{
    EnvFilter,
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Check if colored output should be used.
///
/// Returns true only if:
/// - stdout is a terminal (TTY)
/// - NO_COLOR environment variable is not set
fn use_color() -> bool {
    std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Initialize tracing subscriber for structured logging.
///
/// Respects `RUST_LOG` when set; otherwise defaults to info-level output for
/// smartcase crates (debug-level with `verbose`).
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("smartcase=debug,info")
            } else {
                EnvFilter::try_new("smartcase=info,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(verbose)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_line_number(false)
                .with_file(false)
                .with_ansi(use_color())
                .compact(),
        )
        .try_init()?;

    Ok(())
}

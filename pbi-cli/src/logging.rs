//! Tracing initialization for the pbi CLI
//!
//! Logs go to stderr so stdout carries only command results.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber with environment-based configuration
///
/// Uses the standard RUST_LOG environment variable for filtering:
/// - `RUST_LOG=debug` - Set global level
/// - `RUST_LOG=pbi_reconciler=debug,pbi_client=info` - Set per-crate levels
///
/// Uses RUST_LOG_FORMAT for output format (optional):
/// - `json` - JSON formatted output
/// - `pretty` - Pretty formatted output
/// - `compact` - Compact single-line output (default)
pub fn init_with_defaults(default_filter: &str) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match format.as_str() {
        "json" => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_ansi(false).json())
            .try_init(),
        "pretty" => registry
            .with(fmt::layer().with_writer(std::io::stderr).pretty())
            .try_init(),
        _ => registry
            .with(fmt::layer().with_writer(std::io::stderr).compact())
            .try_init(),
    };

    result.map_err(|e| anyhow!("Failed to initialize tracing: {}", e))
}

/// Default filter for the CLI: quiet unless `--debug` is given
pub fn default_filter(debug: bool) -> &'static str {
    if debug {
        "pbi=debug,pbi_reconciler=debug,pbi_client=debug"
    } else {
        "warn"
    }
}

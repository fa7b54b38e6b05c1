// Tracing bootstrap - JSON lines in production, readable output elsewhere

use crate::config::Settings;
use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber. `RUST_LOG` overrides the default `info` filter.
pub fn init_tracing(settings: &Settings) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let installed = if settings.is_production() {
        tracing_subscriber::fmt()
            .with_ansi(false)
            .with_env_filter(filter)
            .with_file(true)
            .with_line_number(true)
            .json()
            .with_current_span(true)
            .flatten_event(true)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_ansi(true)
            .with_env_filter(filter)
            .with_target(false)
            .try_init()
    };

    installed.map_err(|e| anyhow!("Failed to initialize tracing: {}", e))
}

//! Tracing setup for Verdant binaries.
//!
//! Two sinks: a size-rotated file under the logs directory and stderr.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use verdant_protocol::defaults::DEFAULT_LOG_FILTER;

mod rotation;

pub use rotation::{RotatingFile, RotationPolicy};

pub struct LogConfig<'a> {
    /// Log files are named after this
    pub app_name: &'a str,
    /// Debug output on stderr
    pub verbose: bool,
    /// Warnings only on stderr, for commands that print JSON on stdout
    pub quiet_console: bool,
    /// Created if missing
    pub log_dir: PathBuf,
}

/// Install the global subscriber. `RUST_LOG` overrides the built-in filter.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let dir = &config.log_dir;
    let writer = RotatingFile::open(dir, config.app_name, RotationPolicy::default())
        .with_context(|| format!("Failed to open log file in {}", dir.display()))?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(env_or(DEFAULT_LOG_FILTER.to_string()));
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(console_filter(&config));

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install tracing subscriber")
}

fn env_or(fallback: String) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

fn console_filter(config: &LogConfig<'_>) -> EnvFilter {
    if config.verbose {
        env_or(DEFAULT_LOG_FILTER.replace("=info", "=debug"))
    } else if config.quiet_console {
        EnvFilter::new("warn")
    } else {
        env_or(DEFAULT_LOG_FILTER.to_string())
    }
}

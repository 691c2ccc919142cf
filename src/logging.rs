//! Logging setup.
//!
//! Logs go to stderr only; stdout carries the LSP stream.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_LOG_LEVEL: &str = "info";

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `level`, which defaults to `info`.
/// Calling this more than once is harmless: later calls leave the first
/// subscriber in place.
pub fn init_logging(level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.unwrap_or(DEFAULT_LOG_LEVEL)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_ansi(false))
        .try_init();
}

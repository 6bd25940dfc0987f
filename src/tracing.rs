//! Logging for the keycommander binary
//!
//! The library only emits `tracing` events; installing a subscriber is left to
//! the host. The binary installs two layers:
//!
//! - stderr, filtered by `RUST_LOG` (default `warn`), so replay output on
//!   stdout stays machine-readable
//! - a daily rolling file under the config `logs/` directory that records
//!   this crate's events at debug level and everything else at warn
//!
//! Useful filters:
//! - `RUST_LOG=keycommander::commander=debug` - each dispatch decision with
//!   key, repeat flag and modifiers
//! - `RUST_LOG=keycommander::state=trace` - each held-down state write

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config_paths::{ensure_logs_dir, LOG_FILE_PREFIX};

const CONSOLE_DEFAULT: &str = "warn";
const FILE_FILTER: &str = "warn,keycommander=debug";

/// Install the console and file layers as the global subscriber
pub fn init() {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(CONSOLE_DEFAULT));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    let (file_layer, file_error) = match ensure_logs_dir() {
        Ok(logs_dir) => {
            let appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
            let layer = fmt::layer()
                .with_writer(appender)
                .with_ansi(false)
                .with_target(true)
                .with_filter(EnvFilter::new(FILE_FILTER));
            (Some(layer), None)
        }
        Err(e) => (None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    if let Some(e) = file_error {
        tracing::warn!("File logging disabled: {}", e);
    }
}

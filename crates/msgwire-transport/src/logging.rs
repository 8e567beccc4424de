//! Structured logging initialization.
//!
//! Library code only emits `tracing` events; binaries embedding the driver
//! can call [`init_logging`] to install a subscriber.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format (for development).
    Pretty,
    /// JSON format (for production log aggregation).
    Json,
}

/// Installs a global subscriber filtered to `level` unless `RUST_LOG` is set.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_logging(level: &str, format: LogFormat) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("msgwire_transport={level},msgwire_codec={level}").into());

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_file(true)
                    .with_line_number(true)
                    .with_target(true),
            )
            .try_init()
            .is_ok(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init().is_ok(),
    };

    if installed {
        tracing::info!(level = %level, ?format, "Logging initialized");
    }
    installed
}

//! Diagnostic logging setup.
//!
//! Diagnostics go to stderr so that stdout stays free for audit events and
//! responses. The filter comes from `RUST_LOG`, defaulting to `info`.

use crate::config::LogFormat;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Install the global subscriber once. Later calls are no-ops.
pub fn init_logging(format: LogFormat) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let layer = match format {
            LogFormat::Pretty => fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_ansi(true)
                .with_filter(filter)
                .boxed(),
            LogFormat::Json => fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .json()
                .with_filter(filter)
                .boxed(),
        };

        // Another subscriber may already be installed by the host.
        if tracing_subscriber::registry().with(layer).try_init().is_err() {
            tracing::debug!("global tracing subscriber already initialized");
        }
    });
}

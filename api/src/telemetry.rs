//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

use tk_shared::{LogFormat, LoggingConfig};

/// Installs the global subscriber.
///
/// An unparseable filter falls back to `info`. Calling this twice keeps the first
/// subscriber.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };

    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

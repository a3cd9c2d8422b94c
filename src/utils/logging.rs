// src/utils/logging.rs
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "kisi_extractor=info";

/// Installs the global tracing subscriber.
///
/// Filters come from `RUST_LOG` (e.g. `RUST_LOG=kisi_extractor=trace` shows
/// every opened item). Output goes to stderr; stdout carries the line and
/// record previews.
pub fn setup_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!("Logging setup complete.");
}

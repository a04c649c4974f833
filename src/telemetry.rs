//! Structured logging setup.

use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("failed to install subscriber: {0}")]
    Init(Box<dyn std::error::Error + Send + Sync>),
}

/// Install a global `fmt` subscriber filtered by `filter` (same syntax as `RUST_LOG`)
///
/// Fails if a global subscriber is already installed.
pub fn init(filter: &str) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(filter)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(TelemetryError::Init)
}

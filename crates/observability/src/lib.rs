//! Tracing/logging setup shared by the server and the CLI.

/// Initialize process-wide logging with the format named by `LOG_FORMAT`
/// (JSON when unset or unrecognised).
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    let format = std::env::var("LOG_FORMAT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    tracing::init(format);
}

/// Initialize logging with an explicit format.
pub fn init_with(format: LogFormat) {
    tracing::init(format);
}

pub mod tracing;

pub use tracing::{LogFormat, UnknownLogFormat};

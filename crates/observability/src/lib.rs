//! Tracing and logging setup shared by the binaries.

/// Initialize process-wide tracing/logging in the given output format.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init(format: LogFormat) {
    tracing::init(format);
}

/// Tracing configuration (filters, layers).
pub mod tracing;

pub use tracing::{LogFormat, ParseLogFormatError};

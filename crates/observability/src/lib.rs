//! Process-wide logging setup shared by the binaries.

/// Initialise `tracing` with JSON output filtered by `RUST_LOG` (default
/// `info`).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(LogFormat::Json, tracing::DEFAULT_DIRECTIVE);
}

pub use self::tracing::{DEFAULT_DIRECTIVE, LogFormat};

/// Subscriber configuration (filters, output format).
pub mod tracing;

//! Tracing and logging (shared setup).

pub use self::tracing::{LogFormat, UnknownLogFormat};

/// Initialize process-wide tracing with JSON output at `info`.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    self::tracing::init("info", LogFormat::Json);
}

/// Initialize with a fallback filter and output format.
///
/// `RUST_LOG` still takes precedence over `default_level` when set.
pub fn init_with(default_level: &str, format: LogFormat) {
    self::tracing::init(default_level, format);
}

/// Tracing configuration (filters, layers).
pub mod tracing;

//! Process-wide logging setup.

/// Tracing subscriber initialization.
pub mod tracing;

pub use self::tracing::LogFormat;

/// Initialize process-wide tracing with the format picked from `LOG_FORMAT`.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(LogFormat::from_env());
}

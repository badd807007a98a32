use std::time::Duration;

use glyphbridge_domain::GlyphBridgeError;
use tracing::{info, warn};

/// Log the outcome of a command execution with structured fields.
///
/// # Parameters
/// * `command` - Logical command identifier (e.g. `"bridge::evaluate_script"`).
/// * `elapsed` - Duration the command execution took.
/// * `error` - The failure, if the command did not succeed.
///
/// Callers must avoid forwarding script bodies or other user content in
/// `command`.
#[inline]
pub fn log_command_execution(command: &str, elapsed: Duration, error: Option<&GlyphBridgeError>) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    match error {
        None => info!(command, duration_ms, "command_execution_success"),
        Some(err) => warn!(
            command,
            duration_ms,
            error_type = error_label(err),
            error = %err,
            "command_execution_failure"
        ),
    }
}

/// Convert a `GlyphBridgeError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &GlyphBridgeError) -> &'static str {
    error.label()
}

//! Mapping of resilience failures onto the domain error type

use std::time::Duration;

use glyphbridge_common::resilience::{ResilienceError, RetryError};
use glyphbridge_domain::GlyphBridgeError;

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Flatten a terminal retry failure
///
/// Exhaustion becomes `RetryExhausted`. A failure the classifier refused to
/// retry becomes `PermanentFailure`, keeping the underlying error as its cause.
pub fn from_retry_error(err: RetryError<GlyphBridgeError>) -> GlyphBridgeError {
    match err {
        RetryError::Exhausted { operation, attempts, last_error, .. } => {
            GlyphBridgeError::RetryExhausted { operation, attempts, message: last_error }
        }
        RetryError::Permanent { operation, attempts, last_error, source } => {
            GlyphBridgeError::PermanentFailure {
                operation,
                attempts,
                message: last_error,
                cause: Box::new(source),
            }
        }
        RetryError::Classifier { operation, source, .. } => GlyphBridgeError::Internal(format!(
            "retry classification failed for '{operation}': {source}"
        )),
        RetryError::InvalidConfiguration { message } => GlyphBridgeError::Config(message),
    }
}

/// Flatten a breaker failure around a retry sequence
pub fn from_resilience_error(
    err: ResilienceError<RetryError<GlyphBridgeError>>,
) -> GlyphBridgeError {
    match err {
        ResilienceError::CircuitOpen { operation, retry_after } => {
            GlyphBridgeError::CircuitOpen { operation, retry_after_ms: retry_after.map(millis) }
        }
        ResilienceError::OperationFailed { source, .. } => from_retry_error(source),
        ResilienceError::InvalidConfiguration { message } => GlyphBridgeError::Config(message),
    }
}

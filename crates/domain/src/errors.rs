//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for GlyphBridge
///
/// Serialized as `{"type": "...", "message": ...}` so the panel can render a
/// failure without knowing the Rust type.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum GlyphBridgeError {
    /// The host bridge reported a script failure
    #[error("Bridge error: {0}")]
    Bridge(String),

    /// A failure expected to clear on its own (busy host, dropped connection)
    #[error("Transient error: {0}")]
    Transient(String),

    /// A failure that retrying cannot fix
    #[error("Permanent error: {0}")]
    Permanent(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The notification sink could not deliver a toast
    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// Every allowed attempt failed
    #[error("Operation '{operation}' failed after {attempts} attempt(s): {message}")]
    RetryExhausted { operation: String, attempts: u32, message: String },

    /// A failure the retry classifier refused to retry
    #[error("Operation '{operation}' stopped after {attempts} attempt(s): {message}")]
    PermanentFailure {
        operation: String,
        attempts: u32,
        message: String,
        #[source]
        cause: Box<GlyphBridgeError>,
    },

    /// The circuit for the operation is open; nothing was attempted
    #[error("Circuit open for '{operation}'")]
    CircuitOpen { operation: String, retry_after_ms: Option<u64> },
}

impl GlyphBridgeError {
    /// Whether another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Bridge(_) | Self::Transient(_) | Self::Network(_) | Self::Timeout(_)
        )
    }

    /// Whether the caller should offer a manual retry after this failure
    pub fn offers_manual_retry(&self) -> bool {
        match self {
            Self::RetryExhausted { .. } | Self::CircuitOpen { .. } => true,
            Self::PermanentFailure { cause, .. } => cause.offers_manual_retry(),
            other => other.is_retryable(),
        }
    }

    /// The error behind a wrapped permanent failure, or `self`
    pub fn root_cause(&self) -> &GlyphBridgeError {
        match self {
            Self::PermanentFailure { cause, .. } => cause.root_cause(),
            other => other,
        }
    }

    /// Stable short label for logs and UI badges
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bridge(_) => "bridge",
            Self::Transient(_) => "transient",
            Self::Permanent(_) => "permanent",
            Self::NotFound(_) => "not_found",
            Self::Unsupported(_) => "unsupported",
            Self::Network(_) => "network",
            Self::Timeout(_) => "timeout",
            Self::Config(_) => "config",
            Self::InvalidInput(_) => "invalid_input",
            Self::Notification(_) => "notification",
            Self::Internal(_) => "internal",
            Self::RetryExhausted { .. } => "retry_exhausted",
            Self::PermanentFailure { .. } => "permanent_failure",
            Self::CircuitOpen { .. } => "circuit_open",
        }
    }
}

/// Result type alias for GlyphBridge operations
pub type Result<T> = std::result::Result<T, GlyphBridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    /// Validates `GlyphBridgeError` serialization for the panel payload.
    ///
    /// Assertions:
    /// - Confirms tuple variants serialize as `{type, message}`.
    /// - Confirms struct variants carry their fields under `message`.
    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(GlyphBridgeError::NotFound("glyph 'x'".into()))
            .expect("serialize");
        assert_eq!(json, serde_json::json!({"type": "NotFound", "message": "glyph 'x'"}));

        let json = serde_json::to_value(GlyphBridgeError::RetryExhausted {
            operation: "evaluate_script".into(),
            attempts: 4,
            message: "host busy".into(),
        })
        .expect("serialize");
        assert_eq!(json["type"], "RetryExhausted");
        assert_eq!(json["message"]["attempts"], 4);
    }

    /// Validates retry classification of domain errors.
    ///
    /// Assertions:
    /// - Confirms transport-class errors are retryable.
    /// - Confirms terminal engine errors are not retryable but still offer a
    ///   manual retry.
    #[test]
    fn test_retry_classification() {
        assert!(GlyphBridgeError::Timeout("5s".into()).is_retryable());
        assert!(!GlyphBridgeError::NotFound("glyph".into()).is_retryable());

        let exhausted = GlyphBridgeError::RetryExhausted {
            operation: "insert_glyph:star".into(),
            attempts: 4,
            message: "busy".into(),
        };
        assert!(!exhausted.is_retryable());
        assert!(exhausted.offers_manual_retry());
        assert_eq!(exhausted.label(), "retry_exhausted");
        assert!(!GlyphBridgeError::InvalidInput("empty".into()).offers_manual_retry());
    }

    /// Validates the permanent failure wrapper.
    ///
    /// Assertions:
    /// - Confirms the message names the operation and attempt count.
    /// - Confirms the wrapped cause decides manual retry and is reachable.
    /// - Confirms the cause serializes nested under `message`.
    #[test]
    fn test_permanent_failure_keeps_context() {
        let err = GlyphBridgeError::PermanentFailure {
            operation: "insert_glyph:star".into(),
            attempts: 1,
            message: "Not found: star".into(),
            cause: Box::new(GlyphBridgeError::NotFound("star".into())),
        };

        assert_eq!(
            err.to_string(),
            "Operation 'insert_glyph:star' stopped after 1 attempt(s): Not found: star"
        );
        assert!(!err.is_retryable());
        assert!(!err.offers_manual_retry());
        assert_eq!(err.root_cause(), &GlyphBridgeError::NotFound("star".into()));
        assert_eq!(err.label(), "permanent_failure");

        let json = serde_json::to_value(&err).expect("serialize");
        assert_eq!(json["message"]["attempts"], 1);
        assert_eq!(json["message"]["cause"]["type"], "NotFound");

        let refused_timeout = GlyphBridgeError::PermanentFailure {
            operation: "evaluate_script".into(),
            attempts: 1,
            message: "Timeout: 10s".into(),
            cause: Box::new(GlyphBridgeError::Timeout("10s".into())),
        };
        assert!(refused_timeout.offers_manual_retry());
    }
}

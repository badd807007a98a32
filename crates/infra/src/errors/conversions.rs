//! Conversions from external infrastructure errors into domain errors.

use std::io::{Error as IoError, ErrorKind};

use glyphbridge_domain::GlyphBridgeError;
use serde_json::Error as JsonError;
use toml::de::Error as TomlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub GlyphBridgeError);

impl From<InfraError> for GlyphBridgeError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<GlyphBridgeError> for InfraError {
    fn from(value: GlyphBridgeError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoGlyphBridgeError {
    fn into_glyphbridge(self) -> GlyphBridgeError;
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → GlyphBridgeError */
/* -------------------------------------------------------------------------- */

impl IntoGlyphBridgeError for IoError {
    fn into_glyphbridge(self) -> GlyphBridgeError {
        match self.kind() {
            ErrorKind::NotFound => GlyphBridgeError::NotFound(self.to_string()),
            ErrorKind::PermissionDenied => {
                GlyphBridgeError::Permanent(format!("permission denied: {self}"))
            }
            ErrorKind::InvalidData | ErrorKind::InvalidInput => {
                GlyphBridgeError::InvalidInput(self.to_string())
            }
            ErrorKind::TimedOut => GlyphBridgeError::Timeout(self.to_string()),
            ErrorKind::Interrupted | ErrorKind::WouldBlock => {
                GlyphBridgeError::Transient(self.to_string())
            }
            _ => GlyphBridgeError::Transient(format!("io failure: {self}")),
        }
    }
}

impl From<IoError> for InfraError {
    fn from(value: IoError) -> Self {
        InfraError(value.into_glyphbridge())
    }
}

/* -------------------------------------------------------------------------- */
/* Parser errors → GlyphBridgeError::Config */
/* -------------------------------------------------------------------------- */

impl IntoGlyphBridgeError for TomlError {
    fn into_glyphbridge(self) -> GlyphBridgeError {
        GlyphBridgeError::Config(format!("Invalid TOML format: {}", self.message()))
    }
}

impl From<TomlError> for InfraError {
    fn from(value: TomlError) -> Self {
        InfraError(value.into_glyphbridge())
    }
}

impl IntoGlyphBridgeError for JsonError {
    fn into_glyphbridge(self) -> GlyphBridgeError {
        GlyphBridgeError::Config(format!(
            "Invalid JSON format at line {} column {}: {self}",
            self.line(),
            self.column()
        ))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_glyphbridge())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_not_found_maps_to_not_found() {
        let err: GlyphBridgeError = InfraError::from(IoError::from(ErrorKind::NotFound)).into();
        assert!(matches!(err, GlyphBridgeError::NotFound(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn io_interruption_stays_retryable() {
        let err: GlyphBridgeError = InfraError::from(IoError::from(ErrorKind::Interrupted)).into();
        assert!(err.is_retryable());

        let err: GlyphBridgeError = InfraError::from(IoError::from(ErrorKind::TimedOut)).into();
        assert!(matches!(err, GlyphBridgeError::Timeout(_)));
    }

    #[test]
    fn permission_denied_is_permanent() {
        let err: GlyphBridgeError =
            InfraError::from(IoError::from(ErrorKind::PermissionDenied)).into();
        assert!(matches!(err, GlyphBridgeError::Permanent(_)));
    }

    #[test]
    fn parser_errors_map_to_config() {
        let json = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err: GlyphBridgeError = InfraError::from(json).into();
        assert!(matches!(err, GlyphBridgeError::Config(msg) if msg.contains("line 1")));

        let toml = toml::from_str::<toml::Value>("retry = [").unwrap_err();
        let err: GlyphBridgeError = InfraError::from(toml).into();
        assert!(matches!(err, GlyphBridgeError::Config(msg) if msg.starts_with("Invalid TOML")));
    }
}

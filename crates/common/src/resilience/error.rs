//! Error types for retry and circuit breaker execution

use std::time::Duration;

use thiserror::Error;

use super::classifier::ClassifierError;

/// Simple configuration error for validation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

impl ConfigError {
    pub(crate) fn invalid<S: Into<String>>(message: S) -> Self {
        Self::Invalid { message: message.into() }
    }
}

/// Configuration result type using simple config errors
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Boxed error type for hook and collaborator failures
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Terminal failures of [`RetryExecutor`](super::RetryExecutor)
///
/// `Exhausted` and `Permanent` both mean the executor gave up; they carry the
/// operation name, the number of attempts made and the last error. Callers
/// that only need "gave up vs succeeded" can match on either.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Every allowed attempt failed
    #[error("Operation '{operation}' failed after {attempts} attempt(s): {last_error}")]
    Exhausted {
        operation: String,
        attempts: u32,
        last_error: String,
        #[source]
        source: E,
    },

    /// The classifier refused to retry the failure
    #[error("Operation '{operation}' failed permanently on attempt {attempts}: {last_error}")]
    Permanent {
        operation: String,
        attempts: u32,
        last_error: String,
        #[source]
        source: E,
    },

    /// The classifier itself failed while deciding
    #[error("Retry classification failed for '{operation}' on attempt {attempt}: {source}")]
    Classifier {
        operation: String,
        attempt: u32,
        #[source]
        source: ClassifierError,
    },

    /// The retry configuration is invalid
    #[error("Invalid retry configuration: {message}")]
    InvalidConfiguration { message: String },
}

/// Result type for retry operations
pub type RetryResult<T, E> = Result<T, RetryError<E>>;

impl<E> RetryError<E> {
    /// Operation name, when the failure came from an executed operation
    pub fn operation(&self) -> Option<&str> {
        match self {
            Self::Exhausted { operation, .. }
            | Self::Permanent { operation, .. }
            | Self::Classifier { operation, .. } => Some(operation),
            Self::InvalidConfiguration { .. } => None,
        }
    }

    /// Number of action invocations performed
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Exhausted { attempts, .. } | Self::Permanent { attempts, .. } => *attempts,
            Self::Classifier { attempt, .. } => *attempt,
            Self::InvalidConfiguration { .. } => 0,
        }
    }

    /// Message of the last underlying error
    pub fn last_error(&self) -> Option<&str> {
        match self {
            Self::Exhausted { last_error, .. } | Self::Permanent { last_error, .. } => {
                Some(last_error)
            }
            Self::Classifier { .. } | Self::InvalidConfiguration { .. } => None,
        }
    }

    /// Borrow the last underlying error
    pub fn source_error(&self) -> Option<&E> {
        match self {
            Self::Exhausted { source, .. } | Self::Permanent { source, .. } => Some(source),
            Self::Classifier { .. } | Self::InvalidConfiguration { .. } => None,
        }
    }

    /// Take the last underlying error
    pub fn into_source(self) -> Option<E> {
        match self {
            Self::Exhausted { source, .. } | Self::Permanent { source, .. } => Some(source),
            Self::Classifier { .. } | Self::InvalidConfiguration { .. } => None,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }

    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Permanent { .. })
    }
}

impl<E> From<ConfigError> for RetryError<E> {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Invalid { message } => Self::InvalidConfiguration { message },
        }
    }
}

/// Errors raised by [`CircuitBreaker`](super::CircuitBreaker)
#[derive(Debug, Error)]
pub enum ResilienceError<E> {
    /// Circuit is open; the action was not invoked
    #[error("Circuit breaker is open for '{operation}', rejecting calls")]
    CircuitOpen { operation: String, retry_after: Option<Duration> },

    /// The underlying operation failed
    #[error("Operation '{operation}' failed: {source}")]
    OperationFailed {
        operation: String,
        #[source]
        source: E,
    },

    /// Configuration error
    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

/// Result type for circuit breaker operations
pub type ResilienceResult<T, E> = Result<T, ResilienceError<E>>;

impl<E> ResilienceError<E> {
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, Self::CircuitOpen { .. })
    }

    /// Take the operation's own error, if it ran and failed
    pub fn into_source(self) -> Option<E> {
        match self {
            Self::OperationFailed { source, .. } => Some(source),
            Self::CircuitOpen { .. } | Self::InvalidConfiguration { .. } => None,
        }
    }
}

impl<E> From<ConfigError> for ResilienceError<E> {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Invalid { message } => Self::InvalidConfiguration { message },
        }
    }
}

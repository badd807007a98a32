//! Tracing subscriber setup
//!
//! `RUST_LOG` wins over the configured level so a single run can be made
//! chattier without touching config files.

use glyphbridge_domain::{LogFormat, LoggingConfig};
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Failure to install the global subscriber
#[derive(Debug, Error)]
pub enum LoggingInitError {
    #[error("invalid log filter '{directive}': {message}")]
    InvalidFilter { directive: String, message: String },

    #[error("tracing subscriber already installed")]
    AlreadyInitialized,
}

/// Build the `EnvFilter` for `config`
///
/// # Errors
/// Returns [`LoggingInitError::InvalidFilter`] when neither `RUST_LOG` nor the
/// configured level is a valid directive.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingInitError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level).map_err(|e| LoggingInitError::InvalidFilter {
        directive: config.level.clone(),
        message: e.to_string(),
    })
}

/// Install the global subscriber described by `config`
///
/// # Errors
/// Returns [`LoggingInitError::AlreadyInitialized`] when a subscriber is
/// already set. Callers that may initialise twice (tests, embedded hosts)
/// can treat that variant as success.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), LoggingInitError> {
    let filter = build_filter(config)?;

    let installed = match config.format {
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_current_span(true))
            .try_init(),
    };
    installed.map_err(|_| LoggingInitError::AlreadyInitialized)?;

    tracing::debug!(level = %config.level, format = %config.format, "Tracing initialised");
    Ok(())
}

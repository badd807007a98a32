//! Configuration structures
//!
//! Every section has serde defaults, so a partial TOML or JSON file (or none at
//! all) yields a usable configuration. Durations are stored as milliseconds to
//! keep files and environment variables in the same unit.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_BASE_DELAY_MS, DEFAULT_BRIDGE_TIMEOUT_MS,
    DEFAULT_FAILURE_THRESHOLD, DEFAULT_LOG_LEVEL, DEFAULT_MAX_DELAY_MS, DEFAULT_MAX_RETRIES,
    DEFAULT_RESET_TIMEOUT_MS,
};
use crate::{GlyphBridgeError, Result};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub retry: RetrySettings,
    pub circuit: CircuitSettings,
    pub bridge: BridgeSettings,
    pub logging: LoggingConfig,
}

impl Config {
    /// Check cross-field constraints the types alone cannot express
    ///
    /// # Errors
    /// Returns `GlyphBridgeError::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        self.retry.validate()?;
        self.circuit.validate()?;
        self.bridge.validate()?;
        Ok(())
    }
}

/// Retry policy shared by every bridge operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub classifier: ClassifierKind,
    /// Send a toast before each retry
    pub notify_on_retry: bool,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            classifier: ClassifierKind::default(),
            notify_on_retry: true,
        }
    }
}

impl RetrySettings {
    fn validate(&self) -> Result<()> {
        if self.base_delay_ms == 0 {
            return Err(config_error("retry.base_delay_ms", "must be greater than 0"));
        }
        if self.max_delay_ms < self.base_delay_ms {
            return Err(config_error("retry.max_delay_ms", "must be at least base_delay_ms"));
        }
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier <= 1.0 {
            return Err(config_error("retry.backoff_multiplier", "must be a finite number above 1"));
        }
        Ok(())
    }
}

/// Circuit breaker settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitSettings {
    pub enabled: bool,
    pub failure_threshold: u32,
    pub reset_timeout_ms: u64,
    pub half_open_policy: HalfOpenPolicyKind,
    pub reset_on_success: bool,
}

impl Default for CircuitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            reset_timeout_ms: DEFAULT_RESET_TIMEOUT_MS,
            half_open_policy: HalfOpenPolicyKind::default(),
            reset_on_success: false,
        }
    }
}

impl CircuitSettings {
    fn validate(&self) -> Result<()> {
        if self.failure_threshold == 0 {
            return Err(config_error("circuit.failure_threshold", "must be greater than 0"));
        }
        Ok(())
    }
}

/// Host bridge settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeSettings {
    /// Upper bound for one `evaluate_script` attempt
    pub timeout_ms: u64,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self { timeout_ms: DEFAULT_BRIDGE_TIMEOUT_MS }
    }
}

impl BridgeSettings {
    fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(config_error("bridge.timeout_ms", "must be greater than 0"));
        }
        Ok(())
    }
}

/// Logging output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence when set
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: DEFAULT_LOG_LEVEL.to_string(), format: LogFormat::default() }
    }
}

/// Named retry classification strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    /// Retry every failure
    #[default]
    Always,
    /// Never retry
    Never,
    /// Retry unless the message names a permanent condition
    UnlessPermanent,
    /// Retry only network-class failures
    Transient,
    /// Retry when the error type itself reports a transient failure
    Classified,
}

impl_setting_conversions!(ClassifierKind {
    Always => "always",
    Never => "never",
    UnlessPermanent => "unless_permanent" | "unless-permanent",
    Transient => "transient",
    Classified => "classified" | "typed",
});

/// What a failed half-open trial does to the circuit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HalfOpenPolicyKind {
    /// Reopen only once the failure count reaches the threshold again
    #[default]
    ReopenAtThreshold,
    /// Reopen on any failed trial
    ReopenImmediately,
}

impl_setting_conversions!(HalfOpenPolicyKind {
    ReopenAtThreshold => "reopen_at_threshold" | "threshold",
    ReopenImmediately => "reopen_immediately" | "immediate" | "strict",
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl_setting_conversions!(LogFormat {
    Pretty => "pretty" | "text",
    Json => "json",
});

fn config_error(field: &str, message: &str) -> GlyphBridgeError {
    GlyphBridgeError::Config(format!("{field} {message}"))
}

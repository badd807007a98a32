//! Translation from configuration settings to resilience parameters

use std::time::Duration;

use glyphbridge_common::resilience::{
    CircuitBreakerConfig, ClassifierStrategy, HalfOpenPolicy, RetryConfig,
};
use glyphbridge_domain::{
    ClassifierKind, Config, GlyphBridgeError, HalfOpenPolicyKind, Result,
};

/// Resilience parameters for every bridge operation
#[derive(Debug, Clone, PartialEq)]
pub struct BridgePolicy {
    pub retry: RetryConfig,
    pub classifier: ClassifierStrategy,
    pub notify_on_retry: bool,
    /// `None` disables circuit breaking
    pub circuit: Option<CircuitBreakerConfig>,
    pub bridge_timeout: Duration,
}

impl Default for BridgePolicy {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            classifier: ClassifierStrategy::default(),
            notify_on_retry: true,
            circuit: Some(CircuitBreakerConfig::default()),
            bridge_timeout: Duration::from_millis(
                glyphbridge_domain::constants::DEFAULT_BRIDGE_TIMEOUT_MS,
            ),
        }
    }
}

impl BridgePolicy {
    /// Build and validate a policy from loaded configuration
    ///
    /// # Errors
    /// Returns `GlyphBridgeError::Config` when the settings describe an
    /// invalid retry or breaker configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let retry = RetryConfig::new()
            .max_retries(config.retry.max_retries)
            .base_delay(Duration::from_millis(config.retry.base_delay_ms))
            .max_delay(Duration::from_millis(config.retry.max_delay_ms))
            .backoff_multiplier(config.retry.backoff_multiplier)
            .build()
            .map_err(|e| GlyphBridgeError::Config(e.to_string()))?;

        let circuit = if config.circuit.enabled {
            let breaker = CircuitBreakerConfig::new()
                .failure_threshold(config.circuit.failure_threshold)
                .reset_timeout(Duration::from_millis(config.circuit.reset_timeout_ms))
                .half_open_policy(half_open_policy(config.circuit.half_open_policy))
                .reset_on_success(config.circuit.reset_on_success)
                .build()
                .map_err(|e| GlyphBridgeError::Config(e.to_string()))?;
            Some(breaker)
        } else {
            None
        };

        if config.bridge.timeout_ms == 0 {
            return Err(GlyphBridgeError::Config("bridge.timeout_ms must be greater than 0".into()));
        }

        Ok(Self {
            retry,
            classifier: classifier_strategy(config.retry.classifier),
            notify_on_retry: config.retry.notify_on_retry,
            circuit,
            bridge_timeout: Duration::from_millis(config.bridge.timeout_ms),
        })
    }
}

pub fn classifier_strategy(kind: ClassifierKind) -> ClassifierStrategy {
    match kind {
        ClassifierKind::Always => ClassifierStrategy::Always,
        ClassifierKind::Never => ClassifierStrategy::Never,
        ClassifierKind::UnlessPermanent => ClassifierStrategy::UnlessPermanent,
        ClassifierKind::Transient => ClassifierStrategy::Transient,
        ClassifierKind::Classified => ClassifierStrategy::Classified,
    }
}

pub fn half_open_policy(kind: HalfOpenPolicyKind) -> HalfOpenPolicy {
    match kind {
        HalfOpenPolicyKind::ReopenAtThreshold => HalfOpenPolicy::ReopenAtThreshold,
        HalfOpenPolicyKind::ReopenImmediately => HalfOpenPolicy::ReopenImmediately,
    }
}

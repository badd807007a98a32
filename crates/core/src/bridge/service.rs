//! Bridge service - resilient host operations for the panel
//!
//! Every host call runs inside a retry sequence keyed by its
//! [`OperationKey`]. When circuit breaking is enabled the breaker wraps the
//! whole sequence, so one exhausted sequence counts as one breaker failure and
//! an open circuit skips the sequence entirely.

use std::sync::Arc;

use glyphbridge_common::resilience::{
    CircuitBreaker, CircuitState, OperationRegistry, RegistryStats, RetryExecutor, RetryOptions,
    Sleeper, TokioSleeper,
};
use glyphbridge_domain::constants::MAX_SCRIPT_LENGTH;
use glyphbridge_domain::{GlyphBridgeError, GlyphInsertRequest, OperationKey, Result};
use tracing::{debug, info, instrument};

use super::errors::{from_resilience_error, from_retry_error};
use super::notifier::{notify_failure, ToastRetryHook};
use super::policy::BridgePolicy;
use super::ports::{HostBridge, NotificationSink, ResourceReader};

/// Host operations with retry, circuit breaking, and toasts
pub struct BridgeService {
    bridge: Arc<dyn HostBridge>,
    notifier: Arc<dyn NotificationSink>,
    resources: Option<Arc<dyn ResourceReader>>,
    registry: Arc<OperationRegistry>,
    retry: RetryExecutor<Arc<dyn Sleeper>>,
    breaker: CircuitBreaker,
    policy: BridgePolicy,
}

impl BridgeService {
    /// Create a new bridge service sharing `registry` with other callers
    pub fn new(
        bridge: Arc<dyn HostBridge>,
        notifier: Arc<dyn NotificationSink>,
        registry: Arc<OperationRegistry>,
        policy: BridgePolicy,
    ) -> Self {
        let sleeper: Arc<dyn Sleeper> = Arc::new(TokioSleeper);
        Self {
            bridge,
            notifier,
            resources: None,
            retry: RetryExecutor::with_sleeper(Arc::clone(&registry), sleeper),
            breaker: CircuitBreaker::new(Arc::clone(&registry)),
            registry,
            policy,
        }
    }

    /// Attach the reader used by [`load_resource`](Self::load_resource)
    pub fn with_resource_reader(mut self, reader: Arc<dyn ResourceReader>) -> Self {
        self.resources = Some(reader);
        self
    }

    /// Replace the backoff sleeper (tests use a recording sleeper)
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.retry = RetryExecutor::with_sleeper(Arc::clone(&self.registry), sleeper);
        self
    }

    pub fn policy(&self) -> &BridgePolicy {
        &self.policy
    }

    pub fn registry(&self) -> &Arc<OperationRegistry> {
        &self.registry
    }

    /// Evaluate `script` in the host under `key`
    ///
    /// # Errors
    /// - `InvalidInput` for an empty or oversized script (nothing is attempted)
    /// - `CircuitOpen` when the breaker rejects the call
    /// - `RetryExhausted` when every attempt failed
    /// - `PermanentFailure` when the classifier refused to retry
    #[instrument(skip(self, script), fields(operation = %key, script_len = script.len()))]
    pub async fn evaluate(&self, key: &OperationKey, script: &str) -> Result<String> {
        validate_script(script)?;
        let operation = key.as_str();
        let options = self.retry_options(key, true);

        let run = || {
            self.retry.execute_with_retry(operation, &options, |attempt| {
                self.evaluate_attempt(script, attempt)
            })
        };

        let result = match &self.policy.circuit {
            Some(circuit) => self
                .breaker
                .execute_with_circuit_breaker(operation, circuit, run)
                .await
                .map_err(from_resilience_error),
            None => run().await.map_err(from_retry_error),
        };

        match result {
            Ok(value) => Ok(value),
            Err(err) => {
                notify_failure(self.notifier.as_ref(), key, &err).await;
                Err(err)
            }
        }
    }

    /// Insert a glyph into the active host document
    ///
    /// # Errors
    /// Returns `InvalidInput` for an invalid request, otherwise the errors of
    /// [`evaluate`](Self::evaluate).
    #[instrument(skip(self, request), fields(glyph = %request.glyph))]
    pub async fn insert_glyph(&self, request: &GlyphInsertRequest) -> Result<String> {
        request.validate()?;
        let script = build_insert_script(request)?;
        self.evaluate(&request.operation_key(), &script).await
    }

    /// Read a bundled resource with retry under `read_resource:<path>`
    ///
    /// # Errors
    /// Returns `Unsupported` when no reader is attached, otherwise the mapped
    /// retry failure.
    #[instrument(skip(self))]
    pub async fn load_resource(&self, path: &str) -> Result<String> {
        let reader = self.resources.as_ref().ok_or_else(|| {
            GlyphBridgeError::Unsupported("no resource reader configured".to_string())
        })?;
        let key = OperationKey::read_resource(path);
        let options = self.retry_options(&key, false);

        let result = self
            .retry
            .execute_with_retry(key.as_str(), &options, |_| reader.read_text(path))
            .await
            .map_err(from_retry_error);

        if let Err(err) = &result {
            notify_failure(self.notifier.as_ref(), &key, err).await;
        }
        result
    }

    /// Snapshot of retry counters and circuits
    pub fn stats(&self) -> RegistryStats {
        self.registry.get_stats()
    }

    /// Circuit state for `key` without creating an entry
    pub fn circuit_state(&self, key: &OperationKey) -> CircuitState {
        self.breaker.state(key.as_str())
    }

    /// Clear every counter and circuit (manual "retry all")
    pub fn reset_all(&self) {
        self.registry.reset_all();
        info!("Bridge resilience state cleared");
    }

    /// Clear history for one operation; `true` if anything was removed
    pub fn reset_operation(&self, key: &OperationKey) -> bool {
        let cleared_counter = self.registry.clear_failure(key.as_str());
        let cleared_circuit = self.registry.reset_circuit(key.as_str());
        debug!(operation = %key, cleared_counter, cleared_circuit, "Operation state reset");
        cleared_counter || cleared_circuit
    }

    fn retry_options(&self, key: &OperationKey, toasts: bool) -> RetryOptions<GlyphBridgeError> {
        let classifier = self.policy.classifier.with_check(GlyphBridgeError::is_retryable);
        let options = RetryOptions::new(self.policy.retry.clone()).with_classifier(classifier);
        if toasts && self.policy.notify_on_retry {
            options.on_retry(ToastRetryHook::new(
                Arc::clone(&self.notifier),
                key.clone(),
                self.policy.retry.total_attempts(),
            ))
        } else {
            options
        }
    }

    async fn evaluate_attempt(&self, script: &str, attempt: u32) -> Result<String> {
        debug!(attempt, "Evaluating script in host");
        let timeout = self.policy.bridge_timeout;
        match tokio::time::timeout(timeout, self.bridge.evaluate_script(script)).await {
            Ok(result) => result,
            Err(_) => Err(GlyphBridgeError::Timeout(format!(
                "host did not answer within {} ms",
                timeout.as_millis()
            ))),
        }
    }
}

fn validate_script(script: &str) -> Result<()> {
    if script.trim().is_empty() {
        return Err(GlyphBridgeError::InvalidInput("script is empty".to_string()));
    }
    if script.len() > MAX_SCRIPT_LENGTH {
        return Err(GlyphBridgeError::InvalidInput(format!(
            "script exceeds {MAX_SCRIPT_LENGTH} bytes"
        )));
    }
    Ok(())
}

/// Host call inserting one glyph; arguments are passed as a JSON object
pub fn build_insert_script(request: &GlyphInsertRequest) -> Result<String> {
    let mut normalized = request.clone();
    normalized.glyph = request.glyph.trim().to_string();
    let payload = serde_json::to_string(&normalized)
        .map_err(|e| GlyphBridgeError::Internal(format!("failed to encode glyph request: {e}")))?;
    Ok(format!("glyphBridge.insertGlyph({payload})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Validates `build_insert_script` argument encoding.
    ///
    /// Assertions:
    /// - Confirms the glyph is trimmed and quotes are JSON-escaped.
    /// - Confirms optional fields are passed explicitly.
    #[test]
    fn test_insert_script_escapes_arguments() {
        let request = GlyphInsertRequest::new(" quote\"s ").with_size(14.0);
        let script = build_insert_script(&request).expect("script builds");
        assert_eq!(
            script,
            r#"glyphBridge.insertGlyph({"glyph":"quote\"s","fontFamily":null,"size":14.0})"#
        );
    }

    /// Validates `validate_script` length and blank checks.
    ///
    /// Assertions:
    /// - Confirms ordinary scripts pass.
    /// - Confirms blank and oversized scripts are rejected.
    #[test]
    fn test_validate_script_bounds() {
        assert!(validate_script("app.activeDocument.name").is_ok());
        assert!(validate_script("  ").is_err());
        assert!(validate_script(&"x".repeat(MAX_SCRIPT_LENGTH + 1)).is_err());
    }
}

//! Keyed circuit breaker
//!
//! Each operation key owns a [`CircuitRecord`] in the shared
//! [`OperationRegistry`]. A breaker instance is stateless apart from the
//! registry handle, so any number of callers can gate the same key.
//!
//! ```text
//!            failures >= threshold
//!   Closed ─────────────────────────▶ Open
//!     ▲                                 │ reset_timeout elapsed
//!     │ trial succeeds                  ▼
//!     └──────────────────────────── HalfOpen ──▶ Open (trial fails, per policy)
//! ```

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::constants::{DEFAULT_FAILURE_THRESHOLD, DEFAULT_RESET_TIMEOUT};
use super::error::{ConfigError, ConfigResult, ResilienceError, ResilienceResult};
use super::registry::OperationRegistry;
use super::trace;

//==============================================================================
// State
//==============================================================================

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    /// Circuit is closed, allowing requests
    Closed,
    /// Circuit is open, rejecting requests
    Open,
    /// Circuit is half-open, admitting a single trial request
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "CLOSED"),
            Self::Open => write!(f, "OPEN"),
            Self::HalfOpen => write!(f, "HALF_OPEN"),
        }
    }
}

/// What a failed half-open trial does to the circuit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HalfOpenPolicy {
    /// Re-open only once `failure_count` reaches the threshold again. A trial
    /// failing below the threshold leaves the circuit half-open.
    #[default]
    ReopenAtThreshold,
    /// Any failed trial re-opens the circuit.
    ReopenImmediately,
}

impl FromStr for HalfOpenPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "reopen_at_threshold" | "threshold" => Ok(Self::ReopenAtThreshold),
            "reopen_immediately" | "immediate" | "strict" => Ok(Self::ReopenImmediately),
            other => Err(format!("Invalid HalfOpenPolicy: {other}")),
        }
    }
}

/// Per-key circuit state held by the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitRecord {
    pub state: CircuitState,
    pub failure_count: u32,
    pub last_failure_time: Option<Instant>,
    pub last_success_time: Option<Instant>,
    pub created_at: Instant,
    pub(crate) trial_in_flight: bool,
}

/// Admission decision for one call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Admission {
    Allowed { trial: bool },
    Rejected { state: CircuitState, retry_after: Option<Duration> },
}

type Transition = Option<(CircuitState, CircuitState)>;

impl CircuitRecord {
    pub fn new(now: Instant) -> Self {
        Self {
            state: CircuitState::Closed,
            failure_count: 0,
            last_failure_time: None,
            last_success_time: None,
            created_at: now,
            trial_in_flight: false,
        }
    }

    /// Whether a half-open trial is currently running for this key
    pub fn trial_in_flight(&self) -> bool {
        self.trial_in_flight
    }

    fn transition(&mut self, to: CircuitState) -> Transition {
        let from = self.state;
        self.state = to;
        (from != to).then_some((from, to))
    }

    pub(crate) fn admit(
        &mut self,
        config: &CircuitBreakerConfig,
        now: Instant,
    ) -> (Admission, Transition) {
        match self.state {
            CircuitState::Closed => (Admission::Allowed { trial: false }, None),
            CircuitState::Open => {
                let elapsed = self
                    .last_failure_time
                    .map_or(config.reset_timeout, |at| now.saturating_duration_since(at));
                if elapsed >= config.reset_timeout {
                    self.trial_in_flight = true;
                    let transition = self.transition(CircuitState::HalfOpen);
                    (Admission::Allowed { trial: true }, transition)
                } else {
                    let retry_after = Some(config.reset_timeout - elapsed);
                    (Admission::Rejected { state: CircuitState::Open, retry_after }, None)
                }
            }
            CircuitState::HalfOpen if self.trial_in_flight => {
                (Admission::Rejected { state: CircuitState::HalfOpen, retry_after: None }, None)
            }
            CircuitState::HalfOpen => {
                self.trial_in_flight = true;
                (Admission::Allowed { trial: true }, None)
            }
        }
    }

    pub(crate) fn record_success(
        &mut self,
        config: &CircuitBreakerConfig,
        trial: bool,
        now: Instant,
    ) -> Transition {
        self.last_success_time = Some(now);
        if trial {
            self.trial_in_flight = false;
        }
        match self.state {
            CircuitState::HalfOpen => {
                self.failure_count = 0;
                self.transition(CircuitState::Closed)
            }
            CircuitState::Closed if config.reset_on_success => {
                self.failure_count = 0;
                None
            }
            CircuitState::Closed | CircuitState::Open => None,
        }
    }

    pub(crate) fn record_failure(
        &mut self,
        config: &CircuitBreakerConfig,
        trial: bool,
        now: Instant,
    ) -> Transition {
        self.failure_count = self.failure_count.saturating_add(1);
        self.last_failure_time = Some(now);
        if trial {
            self.trial_in_flight = false;
        }
        let threshold_reached = self.failure_count >= config.failure_threshold;
        match self.state {
            CircuitState::Closed if threshold_reached => self.transition(CircuitState::Open),
            CircuitState::HalfOpen
                if threshold_reached
                    || config.half_open_policy == HalfOpenPolicy::ReopenImmediately =>
            {
                self.transition(CircuitState::Open)
            }
            CircuitState::Closed | CircuitState::HalfOpen | CircuitState::Open => None,
        }
    }
}

//==============================================================================
// Configuration
//==============================================================================

/// Per-call circuit breaker configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Failures that open the circuit
    pub failure_threshold: u32,
    /// Cooldown after the last failure before a half-open trial
    #[serde(with = "crate::utils::serde::duration_millis")]
    pub reset_timeout: Duration,
    pub half_open_policy: HalfOpenPolicy,
    /// Whether a success while closed clears the failure count
    pub reset_on_success: bool,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            reset_timeout: DEFAULT_RESET_TIMEOUT,
            half_open_policy: HalfOpenPolicy::default(),
            reset_on_success: false,
        }
    }
}

impl CircuitBreakerConfig {
    /// Create a new configuration with validation
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::new()
    }

    /// Create a configuration builder (alias for `new()`)
    pub fn builder() -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.failure_threshold == 0 {
            return Err(ConfigError::invalid("failure_threshold must be greater than 0"));
        }
        Ok(())
    }
}

/// Builder for CircuitBreakerConfig
#[derive(Debug, Default)]
pub struct CircuitBreakerConfigBuilder {
    config: CircuitBreakerConfig,
}

impl CircuitBreakerConfigBuilder {
    pub fn new() -> Self {
        Self { config: CircuitBreakerConfig::default() }
    }

    pub fn failure_threshold(mut self, threshold: u32) -> Self {
        self.config.failure_threshold = threshold;
        self
    }

    pub fn reset_timeout(mut self, timeout: Duration) -> Self {
        self.config.reset_timeout = timeout;
        self
    }

    pub fn half_open_policy(mut self, policy: HalfOpenPolicy) -> Self {
        self.config.half_open_policy = policy;
        self
    }

    pub fn reset_on_success(mut self, reset: bool) -> Self {
        self.config.reset_on_success = reset;
        self
    }

    pub fn build(self) -> ConfigResult<CircuitBreakerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

//==============================================================================
// Breaker
//==============================================================================

/// Releases a half-open trial slot if the guarded call never reports back
/// (for example when its future is dropped).
struct TrialGuard<'a> {
    registry: &'a OperationRegistry,
    operation: &'a str,
    armed: bool,
}

impl TrialGuard<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for TrialGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.registry.release_trial(self.operation);
        }
    }
}

/// Circuit breaker gating operations by key
#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    registry: Arc<OperationRegistry>,
}

impl CircuitBreaker {
    pub fn new(registry: Arc<OperationRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<OperationRegistry> {
        &self.registry
    }

    /// Current state for `operation` without creating an entry
    pub fn state(&self, operation: &str) -> CircuitState {
        self.registry.circuit(operation).map_or(CircuitState::Closed, |record| record.state)
    }

    /// Run `action` through the circuit for `operation`.
    ///
    /// Returns [`ResilienceError::CircuitOpen`] without invoking `action` when
    /// the circuit is open and the reset timeout has not elapsed, or when a
    /// half-open trial is already running.
    #[instrument(
        skip(self, config, action),
        fields(failure_threshold = config.failure_threshold)
    )]
    pub async fn execute_with_circuit_breaker<T, E, F, Fut>(
        &self,
        operation: &str,
        config: &CircuitBreakerConfig,
        action: F,
    ) -> ResilienceResult<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        config.validate()?;

        let (admission, transition) =
            self.registry.update_circuit(operation, |record, now| record.admit(config, now));
        self.log_transition(operation, transition);

        let trial = match admission {
            Admission::Allowed { trial } => trial,
            Admission::Rejected { state, retry_after } => {
                trace::circuit_rejected(operation, state, retry_after);
                return Err(ResilienceError::CircuitOpen {
                    operation: operation.to_string(),
                    retry_after,
                });
            }
        };

        let mut guard = TrialGuard { registry: &self.registry, operation, armed: trial };
        let result = action().await;
        guard.disarm();

        match result {
            Ok(value) => {
                let transition = self.registry.update_circuit(operation, |record, now| {
                    record.record_success(config, trial, now)
                });
                self.log_transition(operation, transition);
                Ok(value)
            }
            Err(source) => {
                let transition = self.registry.update_circuit(operation, |record, now| {
                    record.record_failure(config, trial, now)
                });
                self.log_transition(operation, transition);
                Err(ResilienceError::OperationFailed { operation: operation.to_string(), source })
            }
        }
    }

    fn log_transition(&self, operation: &str, transition: Transition) {
        if let Some((from, to)) = transition {
            let failure_count =
                self.registry.circuit(operation).map_or(0, |record| record.failure_count);
            trace::circuit_transition(operation, from, to, failure_count);
        }
    }
}

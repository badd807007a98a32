//! Structured logging for retry sequences and circuit transitions
//!
//! Emits `tracing` events with stable field names (`operation`, `attempt`,
//! `delay_ms`, `failure_count`) so log pipelines can follow one operation
//! across attempts.

use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::circuit_breaker::CircuitState;
use super::classifier::ClassifierError;

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Log scope for one `execute_with_retry` call
#[derive(Debug)]
pub struct RetrySpan<'a> {
    operation: &'a str,
    max_attempts: u32,
}

impl<'a> RetrySpan<'a> {
    pub fn start(operation: &'a str, max_attempts: u32) -> Self {
        debug!(operation, max_attempts, "Starting retry sequence");
        Self { operation, max_attempts }
    }

    pub fn record_attempt(&self, attempt: u32) {
        info!(
            operation = self.operation,
            attempt,
            max_attempts = self.max_attempts,
            "Executing operation attempt"
        );
    }

    pub fn record_failure(&self, attempt: u32, error: &str) {
        warn!(operation = self.operation, attempt, error = %error, "Operation attempt failed");
    }

    pub fn record_retry_scheduled(&self, attempt: u32, delay: Duration) {
        info!(
            operation = self.operation,
            attempt,
            next_attempt = attempt.saturating_add(1),
            delay_ms = millis(delay),
            "Retrying after backoff"
        );
    }

    pub fn record_hook_failure(&self, attempt: u32, error: &str) {
        warn!(
            operation = self.operation,
            attempt,
            error = %error,
            "on_retry hook failed; continuing retry sequence"
        );
    }

    pub fn record_success(&self, attempt: u32, total_delay: Duration, cleared_failures: bool) {
        if attempt > 1 {
            info!(
                operation = self.operation,
                attempts = attempt,
                total_delay_ms = millis(total_delay),
                cleared_failures,
                "Operation succeeded after retries"
            );
        } else {
            debug!(operation = self.operation, cleared_failures, "Operation succeeded");
        }
    }

    pub fn record_exhausted(&self, attempts: u32, total_delay: Duration, failure_count: u32) {
        warn!(
            operation = self.operation,
            attempts,
            total_delay_ms = millis(total_delay),
            failure_count,
            "All retry attempts exhausted"
        );
    }

    pub fn record_permanent(&self, attempt: u32, failure_count: u32) {
        warn!(
            operation = self.operation,
            attempt,
            failure_count,
            "Failure classified as permanent, not retrying"
        );
    }

    pub fn record_classifier_failure(&self, attempt: u32, err: &ClassifierError) {
        error!(
            operation = self.operation,
            attempt,
            error = %err,
            "Retry classifier failed, aborting retry sequence"
        );
    }
}

pub(crate) fn circuit_transition(
    operation: &str,
    from: CircuitState,
    to: CircuitState,
    failure_count: u32,
) {
    match to {
        CircuitState::Open => warn!(
            operation,
            from = %from,
            to = %to,
            failure_count,
            "Circuit breaker opened"
        ),
        CircuitState::HalfOpen | CircuitState::Closed => info!(
            operation,
            from = %from,
            to = %to,
            failure_count,
            "Circuit breaker state changed"
        ),
    }
}

pub(crate) fn circuit_rejected(operation: &str, state: CircuitState, retry_after: Option<Duration>) {
    warn!(
        operation,
        state = %state,
        retry_after_ms = retry_after.map(millis),
        "Circuit breaker rejected call"
    );
}

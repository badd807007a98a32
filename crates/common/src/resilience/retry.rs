//! Bounded retry with exponential backoff
//!
//! [`RetryExecutor::execute_with_retry`] runs an action up to
//! `max_retries + 1` times, one attempt at a time, on the calling task. Between
//! attempts it asks the configured [`RetryClassifier`] whether to continue,
//! notifies an optional [`RetryHook`], and waits through an injected
//! [`Sleeper`]. Final failures are counted in the shared
//! [`OperationRegistry`]; a success clears the count.

use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::backoff::ExponentialBackoff;
use super::classifier::{AlwaysRetry, RetryClassifier};
use super::clock::{Sleeper, TokioSleeper};
use super::constants::{
    DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_BASE_DELAY, DEFAULT_MAX_DELAY, DEFAULT_MAX_RETRIES,
    MAX_RETRIES_LIMIT,
};
use super::error::{BoxedError, ConfigError, ConfigResult, RetryError, RetryResult};
use super::registry::OperationRegistry;
use super::trace::RetrySpan;

//==============================================================================
// Configuration
//==============================================================================

/// Retry limits and backoff parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the initial attempt
    pub max_retries: u32,
    #[serde(with = "crate::utils::serde::duration_millis")]
    pub base_delay: Duration,
    #[serde(with = "crate::utils::serde::duration_millis")]
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration with validation
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// Create a configuration builder (alias for `new()`)
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(ConfigError::invalid(format!(
                "max_retries must be at most {MAX_RETRIES_LIMIT}"
            )));
        }
        if self.base_delay.is_zero() {
            return Err(ConfigError::invalid("base_delay must be greater than 0"));
        }
        if self.max_delay < self.base_delay {
            return Err(ConfigError::invalid("max_delay must be at least base_delay"));
        }
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier <= 1.0 {
            return Err(ConfigError::invalid("backoff_multiplier must be a finite number above 1"));
        }
        Ok(())
    }

    /// Total attempts including the first one
    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff::new(self.base_delay, self.backoff_multiplier, self.max_delay)
    }
}

/// Builder for RetryConfig
#[derive(Debug, Default)]
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl RetryConfigBuilder {
    pub fn new() -> Self {
        Self { config: RetryConfig::default() }
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.config.base_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.config.max_delay = delay;
        self
    }

    pub fn backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.config.backoff_multiplier = multiplier;
        self
    }

    pub fn build(self) -> ConfigResult<RetryConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

//==============================================================================
// Hooks
//==============================================================================

/// Notification invoked before each backoff wait
///
/// Hook failures (returned errors and panics) are logged and swallowed; they
/// never change the retry decision.
#[async_trait]
pub trait RetryHook<E: Send + Sync + 'static>: Send + Sync {
    async fn on_retry(&self, error: &E, attempt: u32, delay: Duration) -> Result<(), BoxedError>;
}

/// Adapts an async closure over the error message into a [`RetryHook`]
pub struct FnRetryHook<F> {
    hook: F,
}

impl<F> FnRetryHook<F> {
    pub fn new<Fut>(hook: F) -> Self
    where
        F: Fn(String, u32, Duration) -> Fut + Send + Sync,
        Fut: Future<Output = Result<(), BoxedError>> + Send,
    {
        Self { hook }
    }
}

impl<F> fmt::Debug for FnRetryHook<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnRetryHook").finish_non_exhaustive()
    }
}

#[async_trait]
impl<E, F, Fut> RetryHook<E> for FnRetryHook<F>
where
    E: fmt::Display + Send + Sync + 'static,
    F: Fn(String, u32, Duration) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), BoxedError>> + Send,
{
    async fn on_retry(&self, error: &E, attempt: u32, delay: Duration) -> Result<(), BoxedError> {
        (self.hook)(error.to_string(), attempt, delay).await
    }
}

async fn guarded_on_retry<E: Send + Sync + 'static>(
    hook: &dyn RetryHook<E>,
    span: &RetrySpan<'_>,
    error: &E,
    attempt: u32,
    delay: Duration,
) {
    match AssertUnwindSafe(hook.on_retry(error, attempt, delay)).catch_unwind().await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => span.record_hook_failure(attempt, &err.to_string()),
        Err(_) => span.record_hook_failure(attempt, "hook panicked"),
    }
}

//==============================================================================
// Options
//==============================================================================

/// Per-call retry options: limits, classifier, and optional hook
pub struct RetryOptions<E: Send + Sync + 'static> {
    pub config: RetryConfig,
    classifier: Arc<dyn RetryClassifier<E>>,
    on_retry: Option<Arc<dyn RetryHook<E>>>,
}

impl<E: Send + Sync + 'static> Clone for RetryOptions<E> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            classifier: Arc::clone(&self.classifier),
            on_retry: self.on_retry.clone(),
        }
    }
}

impl<E: Send + Sync + 'static> fmt::Debug for RetryOptions<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryOptions")
            .field("config", &self.config)
            .field("has_on_retry", &self.on_retry.is_some())
            .finish_non_exhaustive()
    }
}

impl<E: Send + Sync + 'static> Default for RetryOptions<E> {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}

impl<E: Send + Sync + 'static> RetryOptions<E> {
    /// Options that retry every failure and have no hook
    pub fn new(config: RetryConfig) -> Self {
        Self { config, classifier: Arc::new(AlwaysRetry), on_retry: None }
    }

    pub fn with_classifier<C: RetryClassifier<E> + 'static>(mut self, classifier: C) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }

    pub fn with_shared_classifier(mut self, classifier: Arc<dyn RetryClassifier<E>>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn on_retry<H: RetryHook<E> + 'static>(mut self, hook: H) -> Self {
        self.on_retry = Some(Arc::new(hook));
        self
    }

    pub fn with_shared_hook(mut self, hook: Arc<dyn RetryHook<E>>) -> Self {
        self.on_retry = Some(hook);
        self
    }
}

//==============================================================================
// Executor
//==============================================================================

/// Outcome of a retry execution including summary statistics
#[derive(Debug)]
pub struct RetryOutcome<T, E> {
    pub result: RetryResult<T, E>,
    pub attempts: u32,
    pub total_delay: Duration,
    /// Message of the most recent failure, if any attempt failed
    pub last_error: Option<String>,
}

impl<T, E> RetryOutcome<T, E> {
    fn new(
        result: RetryResult<T, E>,
        attempts: u32,
        total_delay: Duration,
        last_error: Option<String>,
    ) -> Self {
        Self { result, attempts, total_delay, last_error }
    }

    pub fn into_result(self) -> RetryResult<T, E> {
        self.result
    }

    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Sequential retry executor sharing history through an [`OperationRegistry`]
#[derive(Debug, Clone)]
pub struct RetryExecutor<S = TokioSleeper> {
    registry: Arc<OperationRegistry>,
    sleeper: S,
}

impl RetryExecutor<TokioSleeper> {
    pub fn new(registry: Arc<OperationRegistry>) -> Self {
        Self { registry, sleeper: TokioSleeper }
    }
}

impl<S: Sleeper> RetryExecutor<S> {
    /// Executor waiting through a custom sleeper
    pub fn with_sleeper(registry: Arc<OperationRegistry>, sleeper: S) -> Self {
        Self { registry, sleeper }
    }

    pub fn registry(&self) -> &Arc<OperationRegistry> {
        &self.registry
    }

    /// Run `action` with retry, returning its value or the terminal error.
    ///
    /// `action` receives the 1-based attempt number and must be safe to invoke
    /// again after a failure.
    #[instrument(
        skip(self, options, action),
        fields(max_retries = options.config.max_retries)
    )]
    pub async fn execute_with_retry<T, E, F, Fut>(
        &self,
        operation: &str,
        options: &RetryOptions<E>,
        action: F,
    ) -> RetryResult<T, E>
    where
        E: fmt::Display + Send + Sync + 'static,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.execute_with_outcome(operation, options, action).await.into_result()
    }

    /// Like [`execute_with_retry`](Self::execute_with_retry), also reporting
    /// attempts and accumulated delay.
    pub async fn execute_with_outcome<T, E, F, Fut>(
        &self,
        operation: &str,
        options: &RetryOptions<E>,
        mut action: F,
    ) -> RetryOutcome<T, E>
    where
        E: fmt::Display + Send + Sync + 'static,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Err(err) = options.config.validate() {
            return RetryOutcome::new(Err(RetryError::from(err)), 0, Duration::ZERO, None);
        }

        let backoff = options.config.backoff();
        let span = RetrySpan::start(operation, options.config.total_attempts());
        let mut total_delay = Duration::ZERO;
        let mut last_error = None;
        let mut attempt: u32 = 1;

        loop {
            span.record_attempt(attempt);

            let error = match action(attempt).await {
                Ok(value) => {
                    let cleared = self.registry.clear_failure(operation);
                    span.record_success(attempt, total_delay, cleared);
                    return RetryOutcome::new(Ok(value), attempt, total_delay, last_error);
                }
                Err(error) => error,
            };

            let message = error.to_string();
            span.record_failure(attempt, &message);

            let retry = match options.classifier.should_retry(&error, attempt) {
                Ok(retry) => retry,
                Err(source) => {
                    span.record_classifier_failure(attempt, &source);
                    let err = RetryError::Classifier {
                        operation: operation.to_string(),
                        attempt,
                        source,
                    };
                    return RetryOutcome::new(Err(err), attempt, total_delay, Some(message));
                }
            };

            if !retry {
                let failures = self.registry.increment_failure(operation);
                span.record_permanent(attempt, failures);
                let err = RetryError::Permanent {
                    operation: operation.to_string(),
                    attempts: attempt,
                    last_error: message.clone(),
                    source: error,
                };
                return RetryOutcome::new(Err(err), attempt, total_delay, Some(message));
            }

            if attempt > options.config.max_retries {
                let failures = self.registry.increment_failure(operation);
                span.record_exhausted(attempt, total_delay, failures);
                let err = RetryError::Exhausted {
                    operation: operation.to_string(),
                    attempts: attempt,
                    last_error: message.clone(),
                    source: error,
                };
                return RetryOutcome::new(Err(err), attempt, total_delay, Some(message));
            }

            let delay = backoff.delay_for(attempt);
            span.record_retry_scheduled(attempt, delay);
            if let Some(hook) = &options.on_retry {
                guarded_on_retry(hook.as_ref(), &span, &error, attempt, delay).await;
            }
            drop(error);

            self.sleeper.sleep(delay).await;
            total_delay += delay;
            last_error = Some(message);
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for the retry executor.
    //!
    //! Timing is driven by `RecordingSleeper`, so no test waits on real time.

    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::resilience::classifier::{FallibleClassifier, NeverRetry, PredicateClassifier};
    use crate::resilience::ClassifierError;
    use crate::testing::RecordingSleeper;

    fn config(max_retries: u32) -> RetryConfig {
        RetryConfig::new()
            .max_retries(max_retries)
            .base_delay(Duration::from_millis(500))
            .max_delay(Duration::from_millis(5_000))
            .backoff_multiplier(1.5)
            .build()
            .expect("valid retry config")
    }

    fn executor() -> (RetryExecutor<RecordingSleeper>, RecordingSleeper) {
        let sleeper = RecordingSleeper::new();
        (RetryExecutor::with_sleeper(OperationRegistry::shared(), sleeper.clone()), sleeper)
    }

    /// Validates `RetryConfig::validate` behavior for invalid parameters.
    ///
    /// Assertions:
    /// - Confirms zero base delay, inverted bounds, and a multiplier of 1 are
    ///   rejected.
    /// - Confirms `max_retries` above the limit is rejected.
    /// - Confirms zero retries is accepted.
    #[test]
    fn test_retry_config_validation() {
        assert!(RetryConfig::new().max_retries(u32::MAX).build().is_err());
        assert!(RetryConfig::new().max_retries(MAX_RETRIES_LIMIT + 1).build().is_err());
        assert!(RetryConfig::new().max_retries(MAX_RETRIES_LIMIT).build().is_ok());
        assert!(RetryConfig::new().base_delay(Duration::ZERO).build().is_err());
        assert!(RetryConfig::new()
            .base_delay(Duration::from_secs(2))
            .max_delay(Duration::from_secs(1))
            .build()
            .is_err());
        assert!(RetryConfig::new().backoff_multiplier(1.0).build().is_err());
        assert!(RetryConfig::new().backoff_multiplier(f64::NAN).build().is_err());
        assert_eq!(RetryConfig::new().max_retries(0).build().map(|c| c.total_attempts()), Ok(1));
    }

    /// Validates `RetryExecutor::execute_with_retry` behavior for the always
    /// failing action scenario.
    ///
    /// Assertions:
    /// - Confirms exactly `max_retries + 1` invocations.
    /// - Confirms `Exhausted` wraps the last error and attempt count.
    /// - Confirms the sleeper saw `max_retries` backoff delays.
    #[tokio::test]
    async fn test_exhausts_after_max_retries() {
        let (executor, sleeper) = executor();
        let calls = Arc::new(AtomicU32::new(0));
        let options = RetryOptions::new(config(2));

        let result: RetryResult<(), String> = executor
            .execute_with_retry("evaluate_script", &options, |attempt| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(format!("failure {attempt}"))
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result {
            Err(RetryError::Exhausted { attempts, last_error, source, .. }) => {
                assert_eq!(attempts, 3);
                assert_eq!(last_error, "failure 3");
                assert_eq!(source, "failure 3");
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
        assert_eq!(
            sleeper.recorded(),
            vec![Duration::from_millis(500), Duration::from_millis(750)]
        );
        assert_eq!(executor.registry().failure_count("evaluate_script"), 1);
    }

    /// Validates `RetryExecutor::execute_with_retry` behavior for the
    /// eventual success scenario.
    ///
    /// Assertions:
    /// - Confirms the value is returned after three invocations.
    /// - Confirms a prior failure counter is cleared.
    #[tokio::test]
    async fn test_succeeds_on_third_attempt_and_clears_counter() {
        let (executor, _sleeper) = executor();
        executor.registry().increment_failure("load_catalog");
        let options = RetryOptions::new(config(2));

        let outcome = executor
            .execute_with_outcome("load_catalog", &options, |attempt| async move {
                if attempt < 3 {
                    Err(format!("transient {attempt}"))
                } else {
                    Ok(attempt * 10)
                }
            })
            .await;

        assert_eq!(outcome.attempts, 3);
        assert_eq!(outcome.total_delay, Duration::from_millis(1_250));
        assert_eq!(outcome.last_error.as_deref(), Some("transient 2"));
        assert_eq!(outcome.into_result().ok(), Some(30));
        assert_eq!(executor.registry().failure_count("load_catalog"), 0);
    }

    /// Validates `NeverRetry` behavior for the non-retryable first failure
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms exactly one invocation regardless of `max_retries`.
    /// - Confirms no backoff wait happened.
    /// - Confirms the final failure is still counted.
    #[tokio::test]
    async fn test_classifier_false_stops_immediately() {
        let (executor, sleeper) = executor();
        let calls = Arc::new(AtomicU32::new(0));
        let options = RetryOptions::new(config(10)).with_classifier(NeverRetry);

        let result: RetryResult<(), String> = executor
            .execute_with_retry("insert_glyph", &options, |_| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err("glyph not found".to_string())
                }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let err = result.expect_err("should stop");
        assert!(err.is_permanent());
        assert_eq!(err.attempts(), 1);
        assert!(sleeper.recorded().is_empty());
        assert_eq!(executor.registry().failure_count("insert_glyph"), 1);
    }

    /// Validates classifier failure propagation.
    ///
    /// Assertions:
    /// - Confirms a failing classifier aborts after the first attempt.
    /// - Confirms the registry is left untouched.
    #[tokio::test]
    async fn test_classifier_error_propagates() {
        let (executor, sleeper) = executor();
        let options = RetryOptions::new(config(3)).with_classifier(FallibleClassifier::new(
            |_: &String, _| Err(ClassifierError::new("policy table missing")),
        ));

        let result: RetryResult<(), String> = executor
            .execute_with_retry("evaluate_script", &options, |_| async {
                Err("boom".to_string())
            })
            .await;

        assert!(matches!(result, Err(RetryError::Classifier { attempt: 1, .. })));
        assert!(sleeper.recorded().is_empty());
        assert_eq!(executor.registry().failure_count("evaluate_script"), 0);
    }

    /// Validates `RetryHook` isolation for a failing hook.
    ///
    /// Assertions:
    /// - Confirms the hook sees each retry with its attempt and delay.
    /// - Confirms hook errors do not stop the retry loop.
    /// - Confirms the hook is not called after the last attempt.
    #[tokio::test]
    async fn test_failing_hook_is_swallowed() {
        let (executor, _sleeper) = executor();
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let seen_hook = Arc::clone(&seen);
        let options =
            RetryOptions::new(config(2)).on_retry(FnRetryHook::new(move |message, attempt, delay| {
                let seen = Arc::clone(&seen_hook);
                async move {
                    seen.lock().push((message, attempt, delay));
                    Err::<(), BoxedError>("toast sink offline".into())
                }
            }));

        let result: RetryResult<(), String> = executor
            .execute_with_retry("evaluate_script", &options, |_| async {
                Err("host busy".to_string())
            })
            .await;

        assert!(result.is_err());
        let seen = seen.lock();
        assert_eq!(
            *seen,
            vec![
                ("host busy".to_string(), 1, Duration::from_millis(500)),
                ("host busy".to_string(), 2, Duration::from_millis(750)),
            ]
        );
    }

    struct PanickingHook;

    #[async_trait]
    impl RetryHook<String> for PanickingHook {
        async fn on_retry(&self, _: &String, _: u32, _: Duration) -> Result<(), BoxedError> {
            panic!("hook exploded")
        }
    }

    /// Validates `RetryHook` isolation for a panicking hook.
    ///
    /// Assertions:
    /// - Confirms a panic inside the hook is caught and the action still
    ///   reaches its successful attempt.
    #[tokio::test]
    async fn test_panicking_hook_is_swallowed() {
        let (executor, _sleeper) = executor();
        let options = RetryOptions::new(config(1)).on_retry(PanickingHook);

        let result: RetryResult<&str, String> = executor
            .execute_with_retry("evaluate_script", &options, |attempt| async move {
                if attempt == 1 {
                    Err("host busy".to_string())
                } else {
                    Ok("done")
                }
            })
            .await;

        assert_eq!(result.ok(), Some("done"));
    }

    /// Validates attempt-aware classification.
    ///
    /// Assertions:
    /// - Confirms the classifier receives 1-based attempt numbers and can stop
    ///   mid-sequence.
    #[tokio::test]
    async fn test_predicate_sees_attempt_numbers() {
        let (executor, sleeper) = executor();
        let options = RetryOptions::new(config(5))
            .with_classifier(PredicateClassifier::new(|_: &String, attempt: u32| attempt < 2));

        let result: RetryResult<(), String> = executor
            .execute_with_retry("evaluate_script", &options, |_| async {
                Err("busy".to_string())
            })
            .await;

        let err = result.expect_err("should stop on attempt 2");
        assert!(err.is_permanent());
        assert_eq!(err.attempts(), 2);
        assert_eq!(sleeper.recorded().len(), 1);
    }

    /// Validates invalid options are rejected before any invocation.
    ///
    /// Assertions:
    /// - Confirms `InvalidConfiguration` and zero invocations.
    #[tokio::test]
    async fn test_invalid_config_rejected_up_front() {
        let (executor, _sleeper) = executor();
        let calls = Arc::new(AtomicU32::new(0));
        let mut options = RetryOptions::<String>::new(RetryConfig::default());
        options.config.backoff_multiplier = 0.5;

        let result: RetryResult<(), String> = executor
            .execute_with_retry("evaluate_script", &options, |_| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .await;

        assert!(matches!(result, Err(RetryError::InvalidConfiguration { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    /// Validates that an unbounded retry count never reaches the loop.
    ///
    /// Assertions:
    /// - Confirms `max_retries = u32::MAX` set directly on the options is
    ///   rejected as invalid configuration.
    /// - Confirms the action is never invoked and nothing was slept.
    #[tokio::test]
    async fn test_unbounded_retry_count_rejected() {
        let (executor, sleeper) = executor();
        let calls = Arc::new(AtomicU32::new(0));
        let mut options = RetryOptions::<String>::new(RetryConfig::default());
        options.config.max_retries = u32::MAX;

        let result: RetryResult<(), String> = executor
            .execute_with_retry("evaluate_script", &options, |_| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err("host busy".to_string())
                }
            })
            .await;

        match result {
            Err(RetryError::InvalidConfiguration { message }) => {
                assert!(message.contains("max_retries"));
            }
            other => panic!("expected InvalidConfiguration, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(sleeper.recorded().is_empty());
    }
}

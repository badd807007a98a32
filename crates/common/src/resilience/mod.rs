//! Retry and circuit breaker primitives keyed by operation name
//!
//! - **[`RetryExecutor`]**: runs a fallible async action with bounded,
//!   exponentially spaced retries and a pluggable [`RetryClassifier`]
//! - **[`CircuitBreaker`]**: fails fast once an operation key has failed
//!   `failure_threshold` times, then admits a single trial after
//!   `reset_timeout`
//! - **[`OperationRegistry`]**: the shared store both of them read and write
//!
//! Nothing in this module is global. Build one registry, wrap it in an `Arc`,
//! and pass it to every executor and breaker that should share history:
//!
//! ```rust
//! # async fn demo() {
//! use glyphbridge_common::resilience::{
//!     CircuitBreaker, CircuitBreakerConfig, OperationRegistry, RetryExecutor, RetryOptions,
//! };
//!
//! let registry = OperationRegistry::shared();
//! let breaker = CircuitBreaker::new(registry.clone());
//! let retry = RetryExecutor::new(registry.clone());
//! let options = RetryOptions::default();
//!
//! let result = breaker
//!     .execute_with_circuit_breaker("evaluate_script", &CircuitBreakerConfig::default(), || {
//!         retry.execute_with_retry("evaluate_script", &options, |_attempt| async {
//!             Ok::<_, String>("done")
//!         })
//!     })
//!     .await;
//! assert!(result.is_ok());
//! # }
//! ```

pub mod backoff;
pub mod circuit_breaker;
pub mod classifier;
pub mod clock;
pub mod constants;
pub mod error;
pub mod registry;
pub mod retry;
pub mod trace;

pub use backoff::{backoff_delay, ExponentialBackoff};
pub use circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerConfigBuilder, CircuitRecord,
    CircuitState, HalfOpenPolicy,
};
pub use classifier::{
    AlwaysRetry, ClassifierError, ClassifierResult, ClassifierStrategy, FallibleClassifier,
    NeverRetry, PredicateClassifier, RetryClassifier, RetryOnClassified, RetryOnTransient,
    RetryUnlessPermanent, StrategyClassifier,
};
pub use clock::{Clock, MockClock, Sleeper, SystemClock, TokioSleeper};
pub use error::{
    BoxedError, ConfigError, ConfigResult, ResilienceError, ResilienceResult, RetryError,
    RetryResult,
};
pub use registry::{CircuitStats, OperationRegistry, RegistryStats};
pub use retry::{
    FnRetryHook, RetryConfig, RetryConfigBuilder, RetryExecutor, RetryHook, RetryOptions,
    RetryOutcome,
};

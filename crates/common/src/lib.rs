//! Shared building blocks for the GlyphBridge crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: error vocabulary and serde helpers
//! - `observability`: `tracing` instrumentation
//! - `runtime`: async resilience (retry executor, circuit breaker, registry)
//! - `test-utils`: deterministic clocks and sleepers for downstream tests

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod error;
#[cfg(feature = "foundation")]
pub mod utils;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod resilience;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(all(feature = "runtime", any(feature = "test-utils", test)))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "foundation")]
pub use error::{CommonError, CommonResult, ErrorClassification, ErrorSeverity, OperationErrorKind};
#[cfg(feature = "runtime")]
pub use resilience::{
    CircuitBreaker, CircuitBreakerConfig, CircuitState, ClassifierStrategy, Clock,
    HalfOpenPolicy, MockClock, OperationRegistry, RegistryStats, ResilienceError,
    ResilienceResult, RetryClassifier, RetryConfig, RetryError, RetryExecutor, RetryHook,
    RetryOptions, RetryResult, SystemClock,
};
#[cfg(feature = "foundation")]
pub use utils::serde::duration_millis;

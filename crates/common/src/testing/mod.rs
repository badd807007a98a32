//! Test doubles for time-dependent resilience code
//!
//! - **[`time`]**: [`RecordingSleeper`] plus re-exports of the clock types
//!
//! ```rust
//! use std::time::Duration;
//!
//! use glyphbridge_common::testing::{MockClock, RecordingSleeper};
//!
//! let clock = MockClock::new();
//! let sleeper = RecordingSleeper::with_clock(clock.clone());
//! // hand `sleeper` to `RetryExecutor::with_sleeper` and `clock` to
//! // `OperationRegistry::with_clock`; every backoff wait then advances `clock`
//! assert!(sleeper.recorded().is_empty());
//! assert_eq!(clock.elapsed(), Duration::ZERO);
//! ```

pub mod time;

pub use time::{Clock, MockClock, RecordingSleeper, SystemClock};

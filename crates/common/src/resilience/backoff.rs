//! Exponential backoff calculation
//!
//! The delay inserted after failed attempt `n` (that is, before attempt
//! `n + 1`) is `min(base_delay × multiplier^(n-1), max_delay)`. The
//! computation is pure and saturates at `max_delay` instead of overflowing.

use std::time::Duration;

use super::constants::{DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_BASE_DELAY, DEFAULT_MAX_DELAY};

/// Compute the backoff delay for a failed attempt.
///
/// `attempt` is 1-based; `0` is treated as `1`. Callers guarantee a positive
/// `multiplier`. The result is never negative and never exceeds `max_delay`.
///
/// ```rust
/// use std::time::Duration;
///
/// use glyphbridge_common::resilience::backoff_delay;
///
/// let base = Duration::from_millis(500);
/// let max = Duration::from_millis(5_000);
/// assert_eq!(backoff_delay(1, base, 1.5, max), base);
/// assert_eq!(backoff_delay(5, base, 1.5, max), Duration::from_micros(2_531_250));
/// assert_eq!(backoff_delay(20, base, 1.5, max), max);
/// ```
#[must_use]
pub fn backoff_delay(attempt: u32, base_delay: Duration, multiplier: f64, max_delay: Duration) -> Duration {
    if base_delay.is_zero() {
        return Duration::ZERO;
    }

    let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
    let scaled = base_delay.as_secs_f64() * multiplier.powi(exponent);

    // NaN and infinity both collapse onto the cap.
    if !scaled.is_finite() || scaled >= max_delay.as_secs_f64() {
        return max_delay;
    }

    Duration::try_from_secs_f64(scaled.max(0.0)).map_or(max_delay, |delay| delay.min(max_delay))
}

/// Exponential backoff parameters bundled for repeated use
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialBackoff {
    pub base_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            base_delay: DEFAULT_BASE_DELAY,
            multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }
}

impl ExponentialBackoff {
    pub fn new(base_delay: Duration, multiplier: f64, max_delay: Duration) -> Self {
        Self { base_delay, multiplier, max_delay }
    }

    /// Delay to wait after failed attempt `attempt`
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        backoff_delay(attempt, self.base_delay, self.multiplier, self.max_delay)
    }

    /// Iterator over the delays for attempts `1..=retries`
    pub fn schedule(&self, retries: u32) -> impl Iterator<Item = Duration> + '_ {
        (1..=retries).map(move |attempt| self.delay_for(attempt))
    }
}

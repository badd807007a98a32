//! Default values for retry and circuit breaker configuration

use std::time::Duration;

/// Retries performed after the initial attempt
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Largest accepted `max_retries`
pub const MAX_RETRIES_LIMIT: u32 = 1_000;

/// Delay before the second attempt
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);

/// Upper bound on any single backoff delay
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(5_000);

/// Growth factor applied per failed attempt
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 1.5;

/// Consecutive failures that open a circuit
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 5;

/// Cooldown before an open circuit admits a half-open trial
pub const DEFAULT_RESET_TIMEOUT: Duration = Duration::from_secs(30);

/// Message fragments marking a failure as permanent (matched case-insensitively)
pub const PERMANENT_ERROR_MARKERS: &[&str] = &["not found", "unsupported", "permanent"];

/// Message fragments marking a failure as network-class transient
pub const TRANSIENT_ERROR_MARKERS: &[&str] = &[
    "timeout",
    "timed out",
    "network",
    "connection",
    "unavailable",
    "temporarily",
    "busy",
    "transient",
    "bridge error",
    "econnreset",
    "econnrefused",
];

//! Application constants
//!
//! Defaults for every setting the loader can override, plus the operation
//! names used as registry keys.

// Retry defaults
pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 500;
pub const DEFAULT_MAX_DELAY_MS: u64 = 5_000;
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 1.5;

// Circuit breaker defaults
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 5;
pub const DEFAULT_RESET_TIMEOUT_MS: u64 = 30_000;

// Host bridge
pub const DEFAULT_BRIDGE_TIMEOUT_MS: u64 = 10_000;
pub const MAX_SCRIPT_LENGTH: usize = 64 * 1024;
pub const MAX_GLYPH_NAME_LENGTH: usize = 128;

// Logging
pub const DEFAULT_LOG_LEVEL: &str = "info";

// Operation names (registry key prefixes)
pub const OP_EVALUATE_SCRIPT: &str = "evaluate_script";
pub const OP_INSERT_GLYPH: &str = "insert_glyph";
pub const OP_READ_RESOURCE: &str = "read_resource";

/// Separator between an operation name and its target in scoped keys
pub const OPERATION_KEY_SEPARATOR: char = ':';

// Notification copy
pub const RETRY_NOTIFICATION_TITLE: &str = "Retrying";
pub const FAILURE_NOTIFICATION_TITLE: &str = "Operation failed";

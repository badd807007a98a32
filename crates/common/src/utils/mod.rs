//! Shared helpers
//!
//! - **[`serde`]**: serde adapters for `Duration` fields

pub mod serde;

pub use self::serde::duration_millis;

//! # GlyphBridge Domain
//!
//! Domain types shared by every GlyphBridge crate.
//!
//! This crate contains:
//! - The domain error type and `Result` alias
//! - Configuration structures with defaults and validation
//! - Operation keys, glyph insertion requests, and notifications
//! - Domain constants
//!
//! ## Architecture
//! - No dependencies on other GlyphBridge crates
//! - Only external dependencies allowed

#[macro_use]
pub mod macros;

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;

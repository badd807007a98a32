//! # GlyphBridge App
//!
//! Application layer for the glyph panel.
//!
//! This crate contains:
//! - Commands the panel front end invokes
//! - Application context (dependency injection)
//! - Command logging helpers
//!
//! ## Architecture
//! - Depends on `common`, `domain`, `core`, and `infra`
//! - Wires the host adapter supplied by the embedder into the bridge service
//! - Owns the single `OperationRegistry` every command shares

pub mod commands;
pub mod context;
pub mod utils;

// Re-export for convenience
pub use commands::*;
pub use context::*;

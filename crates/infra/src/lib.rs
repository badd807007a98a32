//! # GlyphBridge Infrastructure
//!
//! Infrastructure implementations of core ports and process setup.
//!
//! This crate contains:
//! - Layered configuration loading (defaults, files, environment)
//! - Tracing subscriber initialisation
//! - A log-backed notification sink and a filesystem resource reader
//!
//! ## Architecture
//! - Implements traits defined in `glyphbridge-core`
//! - Contains all "impure" code (I/O, environment, global subscriber)

pub mod adapters;
pub mod config;
pub mod errors;
pub mod observability;

// Re-export commonly used items
pub use adapters::{FsResourceReader, TracingNotificationSink};
pub use errors::InfraError;
pub use observability::{init_tracing, LoggingInitError};

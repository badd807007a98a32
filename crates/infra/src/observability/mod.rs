//! Observability infrastructure
//!
//! Owns the process-wide `tracing` subscriber. Library crates only emit
//! events; this module decides where they go.

pub mod logging;

pub use logging::{build_filter, init_tracing, LoggingInitError};

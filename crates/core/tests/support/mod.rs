//! Shared test helpers for `glyphbridge-core` integration tests.
//!
//! Scripted in-memory adapters for every core port, so service tests can
//! focus on retry and breaker behaviour instead of boilerplate.

pub mod mocks;

//! # GlyphBridge Core
//!
//! Use cases for the glyph panel - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces for the host bridge, toasts, and resources
//! - [`BridgeService`], which runs host calls through the resilience engine
//!
//! ## Architecture Principles
//! - Depends only on `glyphbridge-common` and `glyphbridge-domain`
//! - All external collaborators via traits
//! - Resilience state lives in an injected `OperationRegistry`

pub mod bridge;

pub use bridge::ports::{HostBridge, NotificationSink, ResourceReader};
pub use bridge::{BridgePolicy, BridgeService};

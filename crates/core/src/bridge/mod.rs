//! Host bridge use cases
//!
//! - **[`ports`]**: traits implemented by infrastructure adapters
//! - **[`service`]**: [`BridgeService`], retry and breaker composition
//! - **[`policy`]**: configuration to resilience parameter mapping

pub mod errors;
pub mod notifier;
pub mod policy;
pub mod ports;
pub mod service;

pub use policy::BridgePolicy;
pub use ports::{HostBridge, NotificationSink, ResourceReader};
pub use service::{build_insert_script, BridgeService};

//! Port implementations for the bridge service

pub mod notifications;
pub mod resources;

pub use notifications::TracingNotificationSink;
pub use resources::FsResourceReader;

//! Port interfaces for the host bridge
//!
//! These traits define the boundaries between the bridge use cases and the
//! host application, the toast surface, and resource storage.

use async_trait::async_trait;
use glyphbridge_domain::{Notification, Result};

/// Evaluates scripts inside the host application
#[async_trait]
pub trait HostBridge: Send + Sync {
    /// Run `script` in the host and return its string result
    ///
    /// Implementations report host-side failures as `GlyphBridgeError`
    /// variants; the service applies its own timeout around this call.
    async fn evaluate_script(&self, script: &str) -> Result<String>;
}

/// Delivers user-facing toasts
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: Notification) -> Result<()>;
}

/// Reads bundled text resources such as the glyph catalog
#[async_trait]
pub trait ResourceReader: Send + Sync {
    async fn read_text(&self, path: &str) -> Result<String>;
}

//! Notification sink that writes toasts to the log

use async_trait::async_trait;
use glyphbridge_core::NotificationSink;
use glyphbridge_domain::{Notification, NotificationLevel, Result};
use tracing::{error, info, warn};

/// Sink for headless runs where no toast surface exists
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotificationSink;

impl TracingNotificationSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationSink for TracingNotificationSink {
    async fn notify(&self, notification: Notification) -> Result<()> {
        let operation = notification.operation.as_ref().map(|key| key.as_str()).unwrap_or("-");
        let manual_retry = notification.action.is_some();
        match notification.level {
            NotificationLevel::Info => info!(
                id = %notification.id,
                operation,
                title = %notification.title,
                "{}",
                notification.message
            ),
            NotificationLevel::Warning => warn!(
                id = %notification.id,
                operation,
                title = %notification.title,
                "{}",
                notification.message
            ),
            NotificationLevel::Error => error!(
                id = %notification.id,
                operation,
                title = %notification.title,
                manual_retry,
                "{}",
                notification.message
            ),
        }
        Ok(())
    }
}

//! Toast notifications for retry progress and final failures

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use glyphbridge_common::resilience::{BoxedError, RetryHook};
use glyphbridge_domain::constants::{FAILURE_NOTIFICATION_TITLE, RETRY_NOTIFICATION_TITLE};
use glyphbridge_domain::{GlyphBridgeError, Notification, NotificationLevel, OperationKey};
use tracing::warn;

use super::ports::NotificationSink;

/// Retry hook that tells the user another attempt is coming
pub struct ToastRetryHook {
    sink: Arc<dyn NotificationSink>,
    operation: OperationKey,
    total_attempts: u32,
}

impl ToastRetryHook {
    pub fn new(
        sink: Arc<dyn NotificationSink>,
        operation: OperationKey,
        total_attempts: u32,
    ) -> Self {
        Self { sink, operation, total_attempts }
    }
}

#[async_trait]
impl RetryHook<GlyphBridgeError> for ToastRetryHook {
    async fn on_retry(
        &self,
        error: &GlyphBridgeError,
        attempt: u32,
        delay: Duration,
    ) -> Result<(), BoxedError> {
        let message = format!(
            "{error}. Retrying in {} ms (attempt {} of {})",
            delay.as_millis(),
            attempt.saturating_add(1),
            self.total_attempts
        );
        let toast =
            Notification::new(NotificationLevel::Warning, RETRY_NOTIFICATION_TITLE, message)
                .for_operation(self.operation.clone());
        self.sink.notify(toast).await.map_err(|e| Box::new(e) as BoxedError)
    }
}

/// Report a terminal failure; sink errors are logged and dropped
pub async fn notify_failure(
    sink: &dyn NotificationSink,
    operation: &OperationKey,
    error: &GlyphBridgeError,
) {
    let mut toast =
        Notification::new(NotificationLevel::Error, FAILURE_NOTIFICATION_TITLE, error.to_string())
            .for_operation(operation.clone());
    if error.offers_manual_retry() {
        toast = toast.with_manual_retry();
    }

    if let Err(err) = sink.notify(toast).await {
        warn!(operation = %operation, error = %err, "Failed to deliver failure notification");
    }
}

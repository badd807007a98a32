//! In-memory port implementations

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use glyphbridge_core::{HostBridge, NotificationSink, ResourceReader};
use glyphbridge_domain::{GlyphBridgeError, Notification, Result as DomainResult};
use parking_lot::Mutex;

/// Host bridge replaying a scripted list of outcomes.
///
/// Once the script runs out, the fallback outcome is returned for every call.
pub struct ScriptedBridge {
    outcomes: Mutex<VecDeque<DomainResult<String>>>,
    fallback: DomainResult<String>,
    scripts: Mutex<Vec<String>>,
    calls: AtomicU32,
    latency: Option<Duration>,
}

impl ScriptedBridge {
    pub fn new(outcomes: Vec<DomainResult<String>>, fallback: DomainResult<String>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into()),
            fallback,
            scripts: Mutex::new(Vec::new()),
            calls: AtomicU32::new(0),
            latency: None,
        })
    }

    /// Bridge that never answers within `latency`
    pub fn slow(latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(VecDeque::new()),
            fallback: Ok("late".to_string()),
            scripts: Mutex::new(Vec::new()),
            calls: AtomicU32::new(0),
            latency: Some(latency),
        })
    }

    pub fn always(outcome: DomainResult<String>) -> Arc<Self> {
        Self::new(Vec::new(), outcome)
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn scripts(&self) -> Vec<String> {
        self.scripts.lock().clone()
    }
}

#[async_trait]
impl HostBridge for ScriptedBridge {
    async fn evaluate_script(&self, script: &str) -> DomainResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.scripts.lock().push(script.to_string());
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let next = self.outcomes.lock().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

/// Notification sink recording every toast, optionally failing delivery.
#[derive(Default)]
pub struct RecordingNotifier {
    delivered: Mutex<Vec<Notification>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { delivered: Mutex::new(Vec::new()), fail: true })
    }

    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered.lock().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifier {
    async fn notify(&self, notification: Notification) -> DomainResult<()> {
        self.delivered.lock().push(notification);
        if self.fail {
            return Err(GlyphBridgeError::Notification("toast surface closed".to_string()));
        }
        Ok(())
    }
}

/// Resource reader failing a fixed number of times before succeeding.
pub struct FlakyReader {
    failures_left: AtomicU32,
    error: GlyphBridgeError,
    contents: String,
}

impl FlakyReader {
    pub fn new(failures: u32, error: GlyphBridgeError, contents: &str) -> Arc<Self> {
        Arc::new(Self {
            failures_left: AtomicU32::new(failures),
            error,
            contents: contents.to_string(),
        })
    }
}

#[async_trait]
impl ResourceReader for FlakyReader {
    async fn read_text(&self, _path: &str) -> DomainResult<String> {
        let remaining = self.failures_left.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_left.store(remaining - 1, Ordering::SeqCst);
            return Err(self.error.clone());
        }
        Ok(self.contents.clone())
    }
}

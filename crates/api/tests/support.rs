//! Shared fixtures for app command tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use glyphbridge_common::resilience::{OperationRegistry, Sleeper};
use glyphbridge_common::testing::RecordingSleeper;
use glyphbridge_core::{HostBridge, NotificationSink};
use glyphbridge_domain::{Config, GlyphBridgeError, Notification, Result};
use glyphbridge_lib::context::AppContext;
use parking_lot::Mutex;

/// Host that replays queued replies, then repeats `fallback`
pub struct FakeHost {
    replies: Mutex<VecDeque<Result<String>>>,
    fallback: Result<String>,
    scripts: Mutex<Vec<String>>,
    calls: AtomicU32,
}

impl FakeHost {
    pub fn new(replies: Vec<Result<String>>, fallback: Result<String>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            fallback,
            scripts: Mutex::new(Vec::new()),
            calls: AtomicU32::new(0),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Self::new(Vec::new(), Err(GlyphBridgeError::Bridge(message.to_string())))
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn scripts(&self) -> Vec<String> {
        self.scripts.lock().clone()
    }
}

#[async_trait]
impl HostBridge for FakeHost {
    async fn evaluate_script(&self, script: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.scripts.lock().push(script.to_string());
        let next = self.replies.lock().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

#[derive(Default)]
pub struct ToastLog {
    toasts: Mutex<Vec<Notification>>,
}

impl ToastLog {
    pub fn toasts(&self) -> Vec<Notification> {
        self.toasts.lock().clone()
    }
}

#[async_trait]
impl NotificationSink for ToastLog {
    async fn notify(&self, notification: Notification) -> Result<()> {
        self.toasts.lock().push(notification);
        Ok(())
    }
}

/// Configuration with short delays and a low breaker threshold
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.retry.max_retries = 2;
    config.retry.base_delay_ms = 10;
    config.retry.max_delay_ms = 40;
    config.retry.backoff_multiplier = 2.0;
    config.circuit.failure_threshold = 2;
    config.circuit.reset_timeout_ms = 60_000;
    config.bridge.timeout_ms = 1_000;
    config
}

pub struct TestApp {
    pub ctx: AppContext,
    pub host: Arc<FakeHost>,
    pub toasts: Arc<ToastLog>,
    pub sleeper: RecordingSleeper,
}

pub fn build_app(host: Arc<FakeHost>, config: Config) -> TestApp {
    let toasts = Arc::new(ToastLog::default());
    let sleeper = RecordingSleeper::new();
    let shared_sleeper: Arc<dyn Sleeper> = Arc::new(sleeper.clone());
    let ctx = AppContext::builder(config, host.clone())
        .notifier(toasts.clone())
        .registry(OperationRegistry::shared())
        .sleeper(shared_sleeper)
        .build()
        .expect("test context builds");
    TestApp { ctx, host, toasts, sleeper }
}

pub fn delays_ms(sleeper: &RecordingSleeper) -> Vec<u128> {
    sleeper.recorded().iter().map(Duration::as_millis).collect()
}

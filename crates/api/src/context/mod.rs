//! Application context - dependency injection container

use std::path::PathBuf;
use std::sync::Arc;

use glyphbridge_common::resilience::{OperationRegistry, Sleeper};
use glyphbridge_core::{BridgePolicy, BridgeService, HostBridge, NotificationSink, ResourceReader};
use glyphbridge_domain::{Config, GlyphBridgeError, Result};
use glyphbridge_infra::{
    config, init_tracing, FsResourceReader, LoggingInitError, TracingNotificationSink,
};

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    /// Shared retry and circuit history for every command
    pub registry: Arc<OperationRegistry>,
    pub bridge: Arc<BridgeService>,
    pub notifier: Arc<dyn NotificationSink>,
}

impl AppContext {
    /// Load configuration, install logging, and wire the default adapters
    ///
    /// # Errors
    /// Returns `GlyphBridgeError::Config` when configuration cannot be loaded
    /// or the log filter is invalid.
    pub fn new(host: Arc<dyn HostBridge>) -> Result<Self> {
        let config = config::load()?;

        match init_tracing(&config.logging) {
            Ok(()) => {}
            Err(LoggingInitError::AlreadyInitialized) => {
                tracing::debug!("Tracing already initialised, keeping existing subscriber");
            }
            Err(err) => return Err(GlyphBridgeError::Config(err.to_string())),
        }

        Self::new_with_config(config, host)
    }

    /// Build a context from an already loaded configuration
    ///
    /// # Errors
    /// Returns `GlyphBridgeError::Config` if the configuration is invalid.
    pub fn new_with_config(config: Config, host: Arc<dyn HostBridge>) -> Result<Self> {
        Self::builder(config, host).build()
    }

    pub fn builder(config: Config, host: Arc<dyn HostBridge>) -> AppContextBuilder {
        AppContextBuilder {
            config,
            host,
            notifier: None,
            resources: None,
            registry: None,
            sleeper: None,
        }
    }
}

/// Builder for [`AppContext`] with optional adapter overrides
pub struct AppContextBuilder {
    config: Config,
    host: Arc<dyn HostBridge>,
    notifier: Option<Arc<dyn NotificationSink>>,
    resources: Option<Arc<dyn ResourceReader>>,
    registry: Option<Arc<OperationRegistry>>,
    sleeper: Option<Arc<dyn Sleeper>>,
}

impl AppContextBuilder {
    /// Deliver toasts somewhere other than the log
    pub fn notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Serve resources from `root` on disk
    pub fn resource_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.resources = Some(Arc::new(FsResourceReader::new(root)));
        self
    }

    pub fn resource_reader(mut self, reader: Arc<dyn ResourceReader>) -> Self {
        self.resources = Some(reader);
        self
    }

    /// Share an existing registry instead of creating a fresh one
    pub fn registry(mut self, registry: Arc<OperationRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    /// Validate the configuration and assemble the context
    ///
    /// # Errors
    /// Returns `GlyphBridgeError::Config` if the configuration is invalid.
    pub fn build(self) -> Result<AppContext> {
        self.config.validate()?;
        let policy = BridgePolicy::from_config(&self.config)?;

        let registry = self.registry.unwrap_or_else(OperationRegistry::shared);
        let notifier: Arc<dyn NotificationSink> =
            self.notifier.unwrap_or_else(|| Arc::new(TracingNotificationSink::new()));

        let mut service =
            BridgeService::new(self.host, Arc::clone(&notifier), Arc::clone(&registry), policy);
        if let Some(reader) = self.resources {
            service = service.with_resource_reader(reader);
        }
        if let Some(sleeper) = self.sleeper {
            service = service.with_sleeper(sleeper);
        }

        tracing::info!(
            max_retries = self.config.retry.max_retries,
            circuit_enabled = self.config.circuit.enabled,
            "Application context ready"
        );

        Ok(AppContext { config: self.config, registry, bridge: Arc::new(service), notifier })
    }
}

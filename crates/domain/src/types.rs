//! Common data types used throughout the application

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{
    MAX_GLYPH_NAME_LENGTH, OPERATION_KEY_SEPARATOR, OP_EVALUATE_SCRIPT, OP_INSERT_GLYPH,
    OP_READ_RESOURCE,
};
use crate::{GlyphBridgeError, Result};

/// Registry key naming one logical operation, optionally scoped to a target
///
/// `OperationKey::scoped("insert_glyph", "star")` renders as
/// `insert_glyph:star`. Equal keys share retry and circuit history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationKey(String);

impl OperationKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Composite `name:target` key
    pub fn scoped(name: &str, target: &str) -> Self {
        Self(format!("{name}{OPERATION_KEY_SEPARATOR}{target}"))
    }

    pub fn evaluate_script() -> Self {
        Self::new(OP_EVALUATE_SCRIPT)
    }

    pub fn insert_glyph(glyph: &str) -> Self {
        Self::scoped(OP_INSERT_GLYPH, glyph)
    }

    pub fn read_resource(path: &str) -> Self {
        Self::scoped(OP_READ_RESOURCE, path)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Operation name without its target
    pub fn name(&self) -> &str {
        self.0.split_once(OPERATION_KEY_SEPARATOR).map_or(&self.0, |(name, _)| name)
    }

    /// Target portion of a scoped key
    pub fn target(&self) -> Option<&str> {
        self.0.split_once(OPERATION_KEY_SEPARATOR).map(|(_, target)| target)
    }
}

impl fmt::Display for OperationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OperationKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OperationKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Request to place one glyph into the active host document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlyphInsertRequest {
    /// Glyph name as listed in the icon catalog
    pub glyph: String,
    pub font_family: Option<String>,
    /// Point size; the host default is used when absent
    pub size: Option<f32>,
}

impl GlyphInsertRequest {
    pub fn new(glyph: impl Into<String>) -> Self {
        Self { glyph: glyph.into(), font_family: None, size: None }
    }

    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = Some(size);
        self
    }

    /// # Errors
    /// Returns `GlyphBridgeError::InvalidInput` for an empty, oversized, or
    /// control-character glyph name, or a non-positive size.
    pub fn validate(&self) -> Result<()> {
        let glyph = self.glyph.trim();
        if glyph.is_empty() {
            return Err(GlyphBridgeError::InvalidInput("glyph name is empty".to_string()));
        }
        if glyph.chars().count() > MAX_GLYPH_NAME_LENGTH {
            return Err(GlyphBridgeError::InvalidInput(format!(
                "glyph name exceeds {MAX_GLYPH_NAME_LENGTH} characters"
            )));
        }
        if glyph.chars().any(char::is_control) {
            return Err(GlyphBridgeError::InvalidInput(
                "glyph name contains control characters".to_string(),
            ));
        }
        if let Some(size) = self.size {
            if !size.is_finite() || size <= 0.0 {
                return Err(GlyphBridgeError::InvalidInput(format!("invalid glyph size: {size}")));
            }
        }
        Ok(())
    }

    pub fn operation_key(&self) -> OperationKey {
        OperationKey::insert_glyph(self.glyph.trim())
    }
}

/// Severity of a user-facing toast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Warning,
    Error,
}

impl_setting_conversions!(NotificationLevel {
    Info => "info",
    Warning => "warning" | "warn",
    Error => "error",
});

/// Follow-up the panel can offer next to a toast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationAction {
    /// Clear registry state for the operation and run it again
    ManualRetry { operation: OperationKey },
}

/// User-facing toast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
    pub operation: Option<OperationKey>,
    pub action: Option<NotificationAction>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        level: NotificationLevel,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            level,
            title: title.into(),
            message: message.into(),
            operation: None,
            action: None,
            created_at: Utc::now(),
        }
    }

    pub fn for_operation(mut self, operation: OperationKey) -> Self {
        self.operation = Some(operation);
        self
    }

    /// Attach a manual retry affordance for the notification's operation
    pub fn with_manual_retry(mut self) -> Self {
        if let Some(operation) = self.operation.clone() {
            self.action = Some(NotificationAction::ManualRetry { operation });
        }
        self
    }
}

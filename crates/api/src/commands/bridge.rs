//! Host bridge commands

use glyphbridge_domain::{GlyphInsertRequest, OperationKey, Result};
use serde::{Deserialize, Serialize};

use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

/// Arguments for [`evaluate_script`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateScriptRequest {
    pub script: String,
    /// Operation key to track the call under; defaults to `evaluate_script`
    #[serde(default)]
    pub operation: Option<String>,
}

impl EvaluateScriptRequest {
    pub fn new(script: impl Into<String>) -> Self {
        Self { script: script.into(), operation: None }
    }

    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }

    fn operation_key(&self) -> OperationKey {
        match self.operation.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => OperationKey::new(name),
            _ => OperationKey::evaluate_script(),
        }
    }
}

/// Evaluate a script in the host with retry and circuit breaking
///
/// # Example Request
/// ```json
/// { "script": "app.activeDocument.name", "operation": "document_name" }
/// ```
pub async fn evaluate_script(ctx: &AppContext, request: EvaluateScriptRequest) -> Result<String> {
    let request = &request;
    execute_command("bridge::evaluate_script", || async move {
        ctx.bridge.evaluate(&request.operation_key(), &request.script).await
    })
    .await
}

/// Insert a glyph into the active host document
pub async fn insert_glyph(ctx: &AppContext, request: GlyphInsertRequest) -> Result<String> {
    let request = &request;
    execute_command("bridge::insert_glyph", || async move {
        ctx.bridge.insert_glyph(request).await
    })
    .await
}

/// Read a bundled panel resource
pub async fn load_resource(ctx: &AppContext, path: String) -> Result<String> {
    execute_command("bridge::load_resource", || async move {
        ctx.bridge.load_resource(&path).await
    })
    .await
}

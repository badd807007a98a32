//! Retry and circuit state commands
//!
//! Back the panel's failure view: the stats feed the badge, and the reset
//! commands run before a manual retry so the user is not blocked by an open
//! circuit they have chosen to retry through.

use glyphbridge_common::resilience::RegistryStats;
use glyphbridge_domain::{GlyphBridgeError, OperationKey, Result};
use tracing::info;

use crate::context::AppContext;
use crate::utils::command_helpers::execute_command;

/// Snapshot of retry counters and circuit states
pub async fn get_retry_stats(ctx: &AppContext) -> Result<RegistryStats> {
    execute_command("resilience::get_retry_stats", || async move { Ok(ctx.bridge.stats()) }).await
}

/// Clear all retry and circuit history
pub async fn reset_retry_state(ctx: &AppContext) -> Result<()> {
    execute_command("resilience::reset_retry_state", || async move {
        ctx.bridge.reset_all();
        Ok(())
    })
    .await
}

/// Clear history for one operation; `true` if anything was removed
pub async fn reset_circuit(ctx: &AppContext, operation: String) -> Result<bool> {
    execute_command("resilience::reset_circuit", || async move {
        let operation = operation.trim();
        if operation.is_empty() {
            return Err(GlyphBridgeError::InvalidInput("operation must not be empty".into()));
        }
        let cleared = ctx.bridge.reset_operation(&OperationKey::new(operation));
        info!(operation, cleared, "Manual circuit reset");
        Ok(cleared)
    })
    .await
}

//! Confirmation prompt for destructive commands

use super::context::UiContext;
use crate::error::{GatewayError, GatewayResult};
use tracing::debug;

/// Ask before a destructive action.
///
/// `--yes` answers for the user. Without a terminal there is nobody to ask,
/// so the answer is no.
pub async fn confirm(ctx: &UiContext, message: &str) -> GatewayResult<bool> {
    if ctx.auto_yes() {
        return Ok(true);
    }
    if !ctx.is_interactive() {
        debug!("No terminal to confirm '{}', declining", message);
        return Ok(false);
    }

    // cliclack reads stdin synchronously
    let message = message.to_string();
    tokio::task::spawn_blocking(move || cliclack::confirm(message).initial_value(false).interact())
        .await
        .map_err(|e| GatewayError::Internal(format!("Prompt task failed: {}", e)))?
        .map_err(|e| GatewayError::User(format!("Prompt cancelled: {}", e)))
}

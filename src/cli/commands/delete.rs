//! Delete command - remove a job or folder

use super::connect;
use crate::cli::args::DeleteArgs;
use crate::config::Config;
use crate::error::GatewayResult;
use crate::ui::{self, UiContext};

/// Execute the delete command
pub async fn execute(args: DeleteArgs, config: &Config) -> GatewayResult<()> {
    let ctx = UiContext::detect().with_auto_yes(args.yes);
    let gateway = connect(config)?;

    let question = format!("Delete {} and all of its builds?", args.path);
    if !ui::confirm(&ctx, &question).await? {
        let hint = (!ctx.is_interactive()).then_some("Pass --yes to delete without a prompt");
        ui::warning(&ctx, &format!("Not deleting {}", args.path), hint);
        return Ok(());
    }

    gateway.delete_job(&args.path).await?;
    ui::success(&ctx, &format!("Deleted {}", args.path), None);
    Ok(())
}

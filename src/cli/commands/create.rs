//! Create command - create a job from config.xml or an empty folder

use super::connect;
use crate::cli::args::CreateArgs;
use crate::config::Config;
use crate::error::{GatewayError, GatewayResult};
use crate::ui::{self, UiContext};
use tokio::fs;

/// Execute the create command
pub async fn execute(args: CreateArgs, config: &Config) -> GatewayResult<()> {
    let ctx = UiContext::detect();

    // Read the document before touching the server
    let config_xml = match &args.config_file {
        Some(path) => Some(
            fs::read_to_string(path)
                .await
                .map_err(|e| GatewayError::io(format!("reading {}", path.display()), e))?,
        ),
        None => None,
    };

    let gateway = connect(config)?;
    match config_xml {
        Some(xml) => {
            gateway.create_job(&args.path, &xml).await?;
            ui::success(&ctx, &format!("Created job {}", args.path), None);
        }
        None => {
            gateway.create_folder(&args.path).await?;
            ui::success(&ctx, &format!("Created folder {}", args.path), None);
        }
    }

    Ok(())
}

//! CLI command implementations

pub mod builds;
pub mod completions;
pub mod config;
pub mod create;
pub mod delete;
pub mod health;
pub mod jobs;
pub mod log;
pub mod status;
pub mod trigger;
pub mod watch;

pub use builds::execute as builds;
pub use completions::execute as completions;
pub use config::execute as config;
pub use create::execute as create;
pub use delete::execute as delete;
pub use health::execute as health;
pub use jobs::execute as jobs;
pub use log::execute as log;
pub use status::execute as status;
pub use trigger::execute as trigger;
pub use watch::execute as watch;

use crate::cli::args::OutputFormat;
use crate::config::Config;
use crate::error::GatewayResult;
use crate::gateway::Gateway;
use crate::ui::UiContext;
use serde::Serialize;

/// Build a gateway for the configured Jenkins server
fn connect(config: &Config) -> GatewayResult<Gateway> {
    Gateway::from_config(config)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> GatewayResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Terminal context; only the table format shows progress
fn ui_context(format: OutputFormat) -> UiContext {
    UiContext::detect().machine_readable(format != OutputFormat::Table)
}

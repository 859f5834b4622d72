//! Completions command - print shell completion scripts

use crate::cli::args::{Cli, CompletionsArgs};
use crate::error::GatewayResult;
use clap::CommandFactory;
use clap_complete::generate;

/// Execute the completions command
pub fn execute(args: CompletionsArgs) -> GatewayResult<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    generate(args.shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}

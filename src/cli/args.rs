//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Jenkins gateway - browse, inspect and drive Jenkins jobs
///
/// Lists jobs across nested folders, resolves symbolic build references,
/// summarizes console logs and queues builds, with response caching and
/// retries in front of the Jenkins API.
#[derive(Parser, Debug)]
#[command(name = "jenkins-gateway")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "JENKINS_GATEWAY_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List jobs and folders
    Jobs(JobsArgs),

    /// List recent builds of a job
    Builds(BuildsArgs),

    /// Show the status of a build
    Status(BuildArgs),

    /// Summarize the console log of a build
    Log(BuildArgs),

    /// Poll a build until it finishes
    Watch(WatchArgs),

    /// Queue a build
    Trigger(TriggerArgs),

    /// Create a job or folder
    Create(CreateArgs),

    /// Delete a job or folder
    Delete(DeleteArgs),

    /// Check connectivity and credentials
    Health(HealthArgs),

    /// Show or edit configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the jobs command
#[derive(Parser, Debug)]
pub struct JobsArgs {
    /// Folder to list (defaults to the root)
    #[arg(short = 'F', long)]
    pub folder: Option<String>,

    /// Include items in nested folders
    #[arg(short, long)]
    pub recursive: bool,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the builds command
#[derive(Parser, Debug)]
pub struct BuildsArgs {
    /// Job path, e.g. team/app
    pub job: String,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for commands that address one build
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Job path, e.g. team/app
    pub job: String,

    /// Build number or keyword (lastBuild, lastSuccessfulBuild, ...)
    #[arg(default_value = "lastBuild")]
    pub build: String,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the watch command
#[derive(Parser, Debug)]
pub struct WatchArgs {
    /// Job path, e.g. team/app
    pub job: String,

    /// Build number or keyword (lastBuild, lastSuccessfulBuild, ...)
    #[arg(default_value = "lastBuild")]
    pub build: String,

    /// Seconds between polls
    #[arg(short, long, default_value = "10")]
    pub interval: u64,

    /// Give up after this many seconds (0 = never)
    #[arg(short, long, default_value = "3600")]
    pub timeout: u64,

    /// Exit with an error unless the build succeeded
    #[arg(long)]
    pub exit_status: bool,
}

/// Arguments for the trigger command
#[derive(Parser, Debug)]
pub struct TriggerArgs {
    /// Job path, e.g. team/app
    pub job: String,

    /// Build parameters (KEY=VALUE)
    #[arg(short, long = "param", value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the create command
#[derive(Parser, Debug)]
#[command(group(clap::ArgGroup::new("kind").required(true).args(["config_file", "folder"])))]
pub struct CreateArgs {
    /// Path of the new job or folder
    pub path: String,

    /// Job config.xml to create the job from
    #[arg(long)]
    pub config_file: Option<PathBuf>,

    /// Create an empty folder instead of a job
    #[arg(long, conflicts_with = "config_file")]
    pub folder: bool,
}

/// Arguments for the delete command
#[derive(Parser, Debug)]
pub struct DeleteArgs {
    /// Job or folder path
    pub path: String,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the health command
#[derive(Parser, Debug)]
pub struct HealthArgs {
    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration (API token redacted)
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., jenkins.url)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Arguments for the completions command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: Shell,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

/// Parse a build parameter in KEY=VALUE format
fn parse_param(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE format: no '=' found in '{s}'"))?;
    if key.trim().is_empty() {
        return Err(format!("invalid KEY=VALUE format: empty name in '{s}'"));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

//! CLI argument definitions using clap derive

use crate::orchestration::OutputMode;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// forkbox - run JVM test forks inside containers
///
/// Builds the container command for a test fork, rewriting host paths
/// so classpaths and working directories resolve inside the container.
#[derive(Parser, Debug)]
#[command(name = "forkbox")]
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
    #[arg(short, long, global = true, env = "FORKBOX_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the container command for a test fork
    Command(CommandArgs),

    /// Rewrite a host classpath for the container
    Rewrite(RewriteArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Host paths to bind into the container
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BindingArgs {
    /// Project working tree on the host (defaults to current directory)
    #[arg(short, long)]
    pub worktree: Option<PathBuf>,

    /// Local package repository on the host (defaults to ~/.m2/repository)
    #[arg(short, long)]
    pub repository: Option<PathBuf>,
}

/// Arguments for the command command
#[derive(Parser, Debug)]
pub struct CommandArgs {
    /// Project (module) directory name under the working tree
    #[arg(short, long)]
    pub project: String,

    #[command(flatten)]
    pub bindings: BindingArgs,

    /// Container image to use
    #[arg(long)]
    pub image: Option<String>,

    /// Container runtime executable
    #[arg(long)]
    pub runtime: Option<String>,

    /// Fork number, part of the script name
    #[arg(short, long, default_value_t = 0)]
    pub fork: u32,

    /// Output mode (defaults to config, then platform)
    #[arg(short, long)]
    pub mode: Option<OutputMode>,

    /// Directory for the helper script
    #[arg(long)]
    pub script_dir: Option<PathBuf>,

    /// Command to run inside the container, after the shell entry
    #[arg(last = true)]
    pub command: Vec<String>,
}

/// Arguments for the rewrite command
#[derive(Parser, Debug)]
pub struct RewriteArgs {
    #[command(flatten)]
    pub bindings: BindingArgs,

    /// Output format
    #[arg(long, default_value = "plain")]
    pub format: OutputFormat,

    /// Classpath entries (separator-joined lists are split)
    #[arg(required = true)]
    pub entries: Vec<String>,
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
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for the rewrite command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Single separator-joined classpath
    Plain,
    /// One entry per line
    Lines,
    /// JSON array
    Json,
}

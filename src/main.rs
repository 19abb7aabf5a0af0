//! forkbox - container command builder for JVM test forks
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use forkbox::cli::args::{ConfigAction, ConfigArgs};
use forkbox::cli::{Cli, Commands};
use forkbox::config::{Config, ConfigManager, LogFormat};
use forkbox::error::ForkboxResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> ForkboxResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };

    // Init must work even when the existing file no longer parses
    let config = match cli.command {
        Commands::Config(ConfigArgs {
            action: Some(ConfigAction::Init { .. }),
        }) => Config::default(),
        _ => config_manager.load().await?,
    };

    init_logging(cli.verbose, config.general.log_format);
    debug!("Using config: {}", config_manager.path().display());

    // Dispatch to command
    match cli.command {
        Commands::Command(args) => forkbox::cli::commands::command(args, &config).await,
        Commands::Rewrite(args) => forkbox::cli::commands::rewrite(args, &config).await,
        Commands::Config(args) => {
            forkbox::cli::commands::config(args, &config, &config_manager).await
        }
    }
}

/// Logging goes to stderr so stdout stays a clean command or path.
/// 0 = warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, log_format: LogFormat) {
    let filter = match verbose {
        0 => EnvFilter::new("forkbox=warn"),
        1 => EnvFilter::new("forkbox=info"),
        _ => EnvFilter::new("forkbox=debug"),
    };

    if log_format == LogFormat::Json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .with_writer(std::io::stderr)
            .init();
    }
}

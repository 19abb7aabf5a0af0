//! Command command - build the container command for one test fork

use crate::cli::args::CommandArgs;
use crate::cli::commands::resolve_bindings;
use crate::config::Config;
use crate::error::{ForkboxError, ForkboxResult};
use crate::orchestration::{
    create_assembler, AssembledCommand, CommandAssembler, ContainerInvocationSpec,
};
use std::env;
use tracing::{debug, info, warn};

/// Execute the command command
///
/// Batch mode prints the command line. Script mode writes the helper
/// script and prints its path; the caller runs and later removes it.
pub async fn execute(args: CommandArgs, config: &Config) -> ForkboxResult<()> {
    if args.project.trim().is_empty() {
        return Err(ForkboxError::User("Project name cannot be empty".to_string()));
    }

    let bindings = resolve_bindings(&args.bindings, config)?;
    let image = args.image.clone().unwrap_or_else(|| config.container.image.clone());
    let runtime = args
        .runtime
        .clone()
        .unwrap_or_else(|| config.container.runtime.clone());

    let spec = ContainerInvocationSpec::new(image, args.project.clone(), bindings)
        .with_runtime(runtime)
        .with_fork_number(args.fork);
    debug!("Invocation: {:?}", spec);

    let script_dir = match args.script_dir.clone().or_else(|| config.script.dir.clone()) {
        Some(dir) => dir,
        None => {
            env::current_dir().map_err(|e| ForkboxError::io("getting current directory", e))?
        }
    };
    let mode = args.mode.unwrap_or(config.container.mode);

    let mut assembler = create_assembler(spec, mode, &script_dir)?;
    build_or_discard(&mut assembler, &args.command)?;

    match assembler.finish()? {
        AssembledCommand::Inline(command) => println!("{}", command),
        AssembledCommand::Script(script) => {
            info!("Wrote script {}", script.path().display());
            println!("{}", script.path().display());
        }
    }

    Ok(())
}

/// Assemble the command, removing any partly written script on failure
fn build_or_discard(assembler: &mut CommandAssembler, command: &[String]) -> ForkboxResult<()> {
    let result = build(assembler, command);
    if result.is_err() {
        if let Err(cleanup) = assembler.discard() {
            warn!("Failed to discard partial command: {}", cleanup);
        }
    }
    result
}

fn build(assembler: &mut CommandAssembler, command: &[String]) -> ForkboxResult<()> {
    assembler.assemble()?;
    if !command.is_empty() {
        // Closes the quote opened by the shell entry
        assembler.append_command(&format!("{}\"", command.join(" ")))?;
    }
    Ok(())
}

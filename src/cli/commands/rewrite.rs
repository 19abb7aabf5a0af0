//! Rewrite command - translate a host classpath for the container

use crate::cli::args::{OutputFormat, RewriteArgs};
use crate::cli::commands::resolve_bindings;
use crate::classpath::Classpath;
use crate::config::Config;
use crate::error::ForkboxResult;
use crate::orchestration::rewrite_classpath;

/// Execute the rewrite command
pub async fn execute(args: RewriteArgs, config: &Config) -> ForkboxResult<()> {
    let bindings = resolve_bindings(&args.bindings, config)?;

    let classpath = Classpath::new(
        args.entries
            .iter()
            .flat_map(|entry| Classpath::parse(entry).entries().to_vec()),
    );
    let rewritten = rewrite_classpath(&classpath, &bindings)?;

    match args.format {
        OutputFormat::Plain => println!("{}", rewritten),
        OutputFormat::Lines => {
            for entry in &rewritten {
                println!("{}", entry);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rewritten)?),
    }

    Ok(())
}

//! CLI command implementations

pub mod command;
pub mod config;
pub mod rewrite;

pub use command::execute as command;
pub use config::execute as config;
pub use rewrite::execute as rewrite;

use crate::classpath::absolute_path_string;
use crate::cli::args::BindingArgs;
use crate::config::Config;
use crate::error::{ForkboxError, ForkboxResult};
use crate::orchestration::{BindingRole, PathBinding};
use std::env;
use std::path::{Path, PathBuf};

/// Build the repository and worktree bindings, repository first.
///
/// Flags win over config. The worktree defaults to the current directory
/// and the repository to `~/.m2/repository`. Host paths are made absolute
/// with a leading `~` expanded.
pub(crate) fn resolve_bindings(
    args: &BindingArgs,
    config: &Config,
) -> ForkboxResult<Vec<PathBinding>> {
    let mut bindings = Vec::with_capacity(2);

    let repository = args
        .repository
        .clone()
        .or_else(|| config.paths.repository_or_default());
    if let Some(repository) = repository {
        bindings.push(PathBinding::new(
            BindingRole::Repository,
            host_path_string(&repository)?,
            config.container.repository_mount.clone(),
        ));
    }

    let worktree = match args.worktree.clone().or_else(|| config.paths.worktree.clone()) {
        Some(path) => path,
        None => {
            env::current_dir().map_err(|e| ForkboxError::io("getting current directory", e))?
        }
    };
    bindings.push(PathBinding::new(
        BindingRole::Worktree,
        host_path_string(&worktree)?,
        config.container.workspace_mount.clone(),
    ));

    Ok(bindings)
}

fn host_path_string(path: &Path) -> ForkboxResult<String> {
    absolute_path_string(&expand_home(path)?)
}

/// `~` and `~/rest` resolve against the home directory
fn expand_home(path: &Path) -> ForkboxResult<PathBuf> {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir().map(|home| home.join(rest)).ok_or_else(|| {
            ForkboxError::path_resolution(
                path.display().to_string(),
                "home directory is unknown",
            )
        }),
        Err(_) => Ok(path.to_path_buf()),
    }
}

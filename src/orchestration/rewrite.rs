//! Classpath rewriting for the container filesystem

use crate::classpath::{absolute_path_string, Classpath};
use crate::error::ForkboxResult;
use crate::orchestration::binding::{translate, PathBinding};
use std::path::Path;
use tracing::debug;

/// Rewrite every classpath entry so it resolves inside the container.
///
/// Each entry is made absolute, then translated through `bindings`. Entry
/// count and order are preserved. The first entry that cannot be made
/// absolute fails the whole rewrite.
pub fn rewrite_classpath(
    classpath: &Classpath,
    bindings: &[PathBinding],
) -> ForkboxResult<Classpath> {
    let entries = classpath
        .iter()
        .map(|entry| {
            let absolute = absolute_path_string(Path::new(entry))?;
            Ok(translate(&absolute, bindings))
        })
        .collect::<ForkboxResult<Vec<_>>>()?;

    debug!("Rewrote {} classpath entries", entries.len());
    Ok(Classpath::new(entries))
}

//! Host-to-container path bindings and path translation
//!
//! A binding is used twice: once as a `--mount` source/target pair, and
//! once as a substitution rule when rewriting host paths for the container.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Container path the package repository is mounted at
pub const REPOSITORY_MOUNT: &str = "/repository";

/// Container path the project working tree is mounted at
pub const WORKSPACE_MOUNT: &str = "/workspace";

/// What a binding mounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingRole {
    /// Local package repository (e.g. `~/.m2/repository`)
    Repository,
    /// Project working tree
    Worktree,
}

impl BindingRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Repository => "repository",
            Self::Worktree => "worktree",
        }
    }
}

impl fmt::Display for BindingRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A host path prefix and the container path it maps to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathBinding {
    pub role: BindingRole,
    /// Host path, as given. Used verbatim as the mount source.
    pub host_path: String,
    /// Absolute container path, always `/`-separated
    pub container_path: String,
}

impl PathBinding {
    pub fn new(
        role: BindingRole,
        host_path: impl Into<String>,
        container_path: impl Into<String>,
    ) -> Self {
        Self {
            role,
            host_path: host_path.into(),
            container_path: container_path.into(),
        }
    }

    /// Bind a host package repository at [`REPOSITORY_MOUNT`]
    pub fn repository(host_path: impl Into<String>) -> Self {
        Self::new(BindingRole::Repository, host_path, REPOSITORY_MOUNT)
    }

    /// Bind a host working tree at [`WORKSPACE_MOUNT`]
    pub fn worktree(host_path: impl Into<String>) -> Self {
        Self::new(BindingRole::Worktree, host_path, WORKSPACE_MOUNT)
    }

    /// Host prefix used for matching, with separators normalized
    fn match_prefix(&self) -> String {
        normalize_separators(&self.host_path)
    }
}

/// Replace every `\` with `/`
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Translate a host path into the container filesystem.
///
/// Separators are normalized first. The first binding whose (normalized)
/// host path occurs anywhere in `path` wins, and only the first occurrence
/// is replaced. Later bindings are not consulted even if they would also
/// match. Unmatched paths come back normalized but otherwise unchanged.
/// Bindings with an empty host path never match.
pub fn translate(path: &str, bindings: &[PathBinding]) -> String {
    let normalized = normalize_separators(path);

    for binding in bindings {
        let prefix = binding.match_prefix();
        if prefix.is_empty() {
            continue;
        }
        if normalized.contains(&prefix) {
            let translated = normalized.replacen(&prefix, &binding.container_path, 1);
            debug!("Translated {} -> {} ({})", path, translated, binding.role);
            return translated;
        }
    }

    normalized
}

/// Translate the path part of a `file:` URL.
///
/// URL paths carry a leading `/` before a drive letter (`/C:/Users/...`),
/// which is stripped before translation.
pub fn translate_url_path(path: &str, bindings: &[PathBinding]) -> String {
    let stripped = path.strip_prefix('/').unwrap_or(path);
    translate(stripped, bindings)
}

//! Error types for forkbox
//!
//! All modules use `ForkboxResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for forkbox operations
pub type ForkboxResult<T> = Result<T, ForkboxError>;

/// All errors that can occur in forkbox
#[derive(Error, Debug)]
pub enum ForkboxError {
    // Path errors
    #[error("Cannot resolve classpath entry {path}: {reason}")]
    PathResolution { path: String, reason: String },

    // Command assembly errors
    #[error("No {0} binding configured for this invocation")]
    MissingBinding(&'static str),

    #[error("Fragment out of order: {fragment} appended, expected {expected}")]
    FragmentOrder {
        fragment: &'static str,
        expected: &'static str,
    },

    // Script errors
    #[error("Script already closed: {0}")]
    ScriptClosed(PathBuf),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("{0}")]
    User(String),
}

impl ForkboxError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a path resolution error
    pub fn path_resolution(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PathResolution {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::MissingBinding("repository") => {
                Some("Pass --repository or set paths.repository in config")
            }
            Self::MissingBinding("worktree") => {
                Some("Pass --worktree or set paths.worktree in config")
            }
            Self::ScriptClosed(_) => Some("Delete the script before writing a new one"),
            Self::ConfigInvalid { .. } => Some("Run: forkbox config init --force"),
            _ => None,
        }
    }
}

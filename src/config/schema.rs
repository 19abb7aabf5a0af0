//! Configuration schema for forkbox
//!
//! Configuration is stored at `~/.config/forkbox/config.toml`

use crate::orchestration::assembler::{OutputMode, DEFAULT_RUNTIME};
use crate::orchestration::binding::{REPOSITORY_MOUNT, WORKSPACE_MOUNT};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Container settings
    pub container: ContainerConfig,

    /// Host paths to bind into the container
    pub paths: PathsConfig,

    /// Helper script settings
    pub script: ScriptConfig,
}

/// Log line format on stderr
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// General application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: LogFormat,
}

/// Container configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Runtime executable
    pub runtime: String,

    /// Image the tests run in
    pub image: String,

    /// Where the package repository is mounted
    pub repository_mount: String,

    /// Where the working tree is mounted
    pub workspace_mount: String,

    /// Output mode: auto, batch or script
    pub mode: OutputMode,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            runtime: DEFAULT_RUNTIME.to_string(),
            image: "openjdk:11".to_string(),
            repository_mount: REPOSITORY_MOUNT.to_string(),
            workspace_mount: WORKSPACE_MOUNT.to_string(),
            mode: OutputMode::Auto,
        }
    }
}

impl Config {
    /// Reject values that would produce an unusable container command
    pub fn validate(&self) -> Result<(), String> {
        let container = &self.container;
        if container.runtime.trim().is_empty() {
            return Err("container.runtime cannot be empty".to_string());
        }
        if container.image.trim().is_empty() {
            return Err("container.image cannot be empty".to_string());
        }
        for (key, mount) in [
            ("container.repository_mount", &container.repository_mount),
            ("container.workspace_mount", &container.workspace_mount),
        ] {
            if !mount.starts_with('/') {
                return Err(format!(
                    "{} must be an absolute container path, got '{}'",
                    key, mount
                ));
            }
        }
        if container.repository_mount == container.workspace_mount {
            return Err(format!(
                "container.repository_mount and container.workspace_mount are both '{}'",
                container.repository_mount
            ));
        }
        Ok(())
    }
}

/// Host paths
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Local package repository (default: ~/.m2/repository)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<PathBuf>,

    /// Project working tree (default: current directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worktree: Option<PathBuf>,
}

impl PathsConfig {
    /// Configured repository, falling back to `~/.m2/repository`
    pub fn repository_or_default(&self) -> Option<PathBuf> {
        self.repository
            .clone()
            .or_else(|| dirs::home_dir().map(|home| home.join(".m2").join("repository")))
    }
}

/// Helper script configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    /// Directory scripts are written to (default: current directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

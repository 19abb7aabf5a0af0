//! Assembler factory
//!
//! Picks batch or script output for the host platform. The Windows command
//! processor cannot take the full container command inline, so Windows
//! hosts get a helper script; everything else runs the command directly.

use crate::error::ForkboxResult;
use crate::orchestration::assembler::{CommandAssembler, ContainerInvocationSpec, OutputMode};
use std::path::Path;
use tracing::debug;

/// Detected platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOS,
    Linux,
    /// Anything else with a POSIX-ish shell
    Other,
}

impl Platform {
    /// Detect the current platform
    pub fn detect() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    fn from_os(os: &str) -> Self {
        match os {
            "windows" => Platform::Windows,
            "macos" => Platform::MacOS,
            "linux" => Platform::Linux,
            _ => Platform::Other,
        }
    }

    /// Get a human-readable platform name
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Windows => "Windows",
            Platform::MacOS => "macOS",
            Platform::Linux => "Linux",
            Platform::Other => "Other",
        }
    }

    /// Output mode the host shell needs
    pub fn default_output_mode(&self) -> OutputMode {
        match self {
            Platform::Windows => OutputMode::Script,
            _ => OutputMode::Batch,
        }
    }
}

impl OutputMode {
    /// Replace `Auto` with the platform's mode
    pub fn resolve(self, platform: Platform) -> OutputMode {
        match self {
            OutputMode::Auto => platform.default_output_mode(),
            mode => mode,
        }
    }
}

/// Create an assembler for `mode`, resolving `Auto` against the current platform
///
/// # Arguments
/// * `spec` - The fork's invocation
/// * `mode` - Requested output mode
/// * `script_dir` - Where a helper script goes, if one is needed
pub fn create_assembler(
    spec: ContainerInvocationSpec,
    mode: OutputMode,
    script_dir: &Path,
) -> ForkboxResult<CommandAssembler> {
    let platform = Platform::detect();
    let resolved = mode.resolve(platform);
    debug!(
        "Output mode {} resolved to {} on {}",
        mode,
        resolved,
        platform.name()
    );

    match resolved {
        OutputMode::Script => CommandAssembler::script(spec, script_dir),
        OutputMode::Batch | OutputMode::Auto => Ok(CommandAssembler::batch(spec)),
    }
}

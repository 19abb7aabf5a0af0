//! Helper script lifecycle
//!
//! Where the host shell cannot take the container command inline, the
//! command is written to a script file and the script is executed instead.
//!
//! | State | File | Stream |
//! |-------|------|--------|
//! | Uninitialized | absent (or removed) | none |
//! | Open | created | held |
//! | Closed | retained | released |
//!
//! The first write opens the file. `close` releases the stream and keeps
//! the file. `delete` closes if needed, removes the file and returns to
//! `Uninitialized`. Every I/O failure is returned to the caller.

use crate::error::{ForkboxError, ForkboxResult};
use std::fs::File;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Suffix of every helper script file name
pub const SCRIPT_SUFFIX: &str = "DockerCommandLine.bat";

/// Script file name for one fork of a project
pub fn script_file_name(project_name: &str, fork_number: u32) -> String {
    format!("{}{}{}", project_name, fork_number, SCRIPT_SUFFIX)
}

/// Observable lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStatus {
    Uninitialized,
    Open,
    Closed,
}

enum ScriptState {
    Uninitialized,
    Open(BufWriter<File>),
    Closed,
}

/// An on-disk helper script owned by exactly one fork
pub struct ScriptLifecycle {
    path: PathBuf,
    state: ScriptState,
}

impl ScriptLifecycle {
    /// Create a handle for `path`. Nothing is written until the first `write`.
    pub fn new(path: impl AsRef<Path>) -> ForkboxResult<Self> {
        let path = path.as_ref();
        let path = std::path::absolute(path).map_err(|e| {
            ForkboxError::path_resolution(path.display().to_string(), e.to_string())
        })?;

        Ok(Self {
            path,
            state: ScriptState::Uninitialized,
        })
    }

    /// Handle for the script of `project_name`'s fork `fork_number` in `dir`
    pub fn for_fork(dir: &Path, project_name: &str, fork_number: u32) -> ForkboxResult<Self> {
        Self::new(dir.join(script_file_name(project_name, fork_number)))
    }

    /// Absolute path of the script, whether or not it exists yet
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn status(&self) -> ScriptStatus {
        match self.state {
            ScriptState::Uninitialized => ScriptStatus::Uninitialized,
            ScriptState::Open(_) => ScriptStatus::Open,
            ScriptState::Closed => ScriptStatus::Closed,
        }
    }

    /// Append text, creating the file on first use
    pub fn write(&mut self, text: &str) -> ForkboxResult<()> {
        let result = self.writer()?.write_all(text.as_bytes());
        result.map_err(|e| ForkboxError::io(format!("writing script {}", self.path.display()), e))
    }

    /// Flush and release the stream. No-op unless open.
    pub fn close(&mut self) -> ForkboxResult<()> {
        // Leave Open before flushing so the stream is released even on error
        match std::mem::replace(&mut self.state, ScriptState::Closed) {
            ScriptState::Open(mut writer) => {
                writer.flush().map_err(|e| {
                    ForkboxError::io(format!("closing script {}", self.path.display()), e)
                })?;
                debug!("Closed script {}", self.path.display());
                Ok(())
            }
            previous => {
                self.state = previous;
                Ok(())
            }
        }
    }

    /// Close if open, remove the file, and reset. No-op if never opened.
    pub fn delete(&mut self) -> ForkboxResult<()> {
        match self.state {
            ScriptState::Uninitialized => return Ok(()),
            ScriptState::Open(_) => self.close()?,
            ScriptState::Closed => {}
        }

        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            // Already gone is as good as deleted
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(ForkboxError::io(
                    format!("deleting script {}", self.path.display()),
                    e,
                ))
            }
        }

        self.state = ScriptState::Uninitialized;
        info!("Deleted script {}", self.path.display());
        Ok(())
    }

    fn writer(&mut self) -> ForkboxResult<&mut BufWriter<File>> {
        if matches!(self.state, ScriptState::Uninitialized) {
            let writer = self.open()?;
            self.state = ScriptState::Open(writer);
        }

        match &mut self.state {
            ScriptState::Open(writer) => Ok(writer),
            _ => Err(ForkboxError::ScriptClosed(self.path.clone())),
        }
    }

    fn open(&self) -> ForkboxResult<BufWriter<File>> {
        let file = File::create(&self.path).map_err(|e| {
            ForkboxError::io(format!("creating script {}", self.path.display()), e)
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o755);
            std::fs::set_permissions(&self.path, perms).map_err(|e| {
                ForkboxError::io(
                    format!("setting permissions on script {}", self.path.display()),
                    e,
                )
            })?;
        }

        debug!("Created script {}", self.path.display());
        Ok(BufWriter::new(file))
    }
}

impl Drop for ScriptLifecycle {
    fn drop(&mut self) {
        if let ScriptState::Open(writer) = &mut self.state {
            if let Err(e) = writer.flush() {
                warn!("Failed to flush script {}: {}", self.path.display(), e);
            }
        }
    }
}

impl std::fmt::Debug for ScriptLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptLifecycle")
            .field("path", &self.path)
            .field("status", &self.status())
            .finish()
    }
}

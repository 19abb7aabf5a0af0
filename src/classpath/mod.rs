//! Classpath values and the per-build classpath cache
//!
//! A classpath is an ordered list of absolute file paths. Order is
//! classloading precedence, so nothing here sorts or deduplicates.

pub mod cache;

pub use cache::ClasspathCache;

use crate::error::{ForkboxError, ForkboxResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Separator between entries when a classpath is rendered as one string
#[cfg(windows)]
pub const PATH_SEPARATOR: char = ';';
#[cfg(not(windows))]
pub const PATH_SEPARATOR: char = ':';

/// Ordered, immutable list of classpath entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Classpath {
    entries: Vec<String>,
}

impl Classpath {
    /// Create a classpath from entries, keeping their order
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// Classpath with no entries
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a separator-joined classpath string. Empty segments are skipped.
    pub fn parse(joined: &str) -> Self {
        Self::new(joined.split(PATH_SEPARATOR).filter(|s| !s.is_empty()))
    }

    /// Entries in classloading order
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as a single string joined with [`PATH_SEPARATOR`]
    pub fn to_path_string(&self) -> String {
        self.entries.join(&PATH_SEPARATOR.to_string())
    }
}

impl fmt::Display for Classpath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_path_string())
    }
}

impl<'a> IntoIterator for &'a Classpath {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// A resolved dependency and the file it resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    /// Resolved file on the host
    pub file: PathBuf,
}

impl Artifact {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
        file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            file: file.into(),
        }
    }

    /// `groupId:artifactId:version`, the usual cache key
    pub fn coordinate(&self) -> String {
        format!("{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

/// Resolve a path to an absolute, UTF-8 string without touching the filesystem.
///
/// Relative paths are joined to the current directory. Symlinks are not
/// followed and the path does not need to exist.
pub fn absolute_path_string(path: &Path) -> ForkboxResult<String> {
    let display = path.display().to_string();
    let absolute = std::path::absolute(path)
        .map_err(|e| ForkboxError::path_resolution(&display, e.to_string()))?;

    absolute
        .into_os_string()
        .into_string()
        .map_err(|_| ForkboxError::path_resolution(display, "path is not valid UTF-8"))
}

//! Classpath cache shared by the forks of one build
//!
//! Keys are artifact coordinates. There is no eviction: the cache lives as
//! long as the build that owns it. Concurrent misses on the same key may
//! both compute; the last insert wins, which is harmless because the value
//! is a pure function of the artifact set.

use crate::classpath::{absolute_path_string, Artifact, Classpath};
use crate::error::ForkboxResult;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// Concurrent map from cache key to a resolved classpath
#[derive(Debug, Default)]
pub struct ClasspathCache {
    entries: RwLock<HashMap<String, Classpath>>,
}

impl ClasspathCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached classpath for a key
    pub fn get(&self, key: &str) -> Option<Classpath> {
        // A panic while holding the lock cannot leave a half-inserted entry
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    /// Store a classpath, replacing any previous value for the key
    pub fn put(&self, key: impl Into<String>, classpath: Classpath) {
        let key = key.into();
        debug!("Caching classpath for {} ({} entries)", key, classpath.len());
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key, classpath);
    }

    /// Return the cached classpath for `key`, or build one from the
    /// artifacts' absolute file paths (in iteration order) and cache it.
    ///
    /// The lookup and the insert are separate lock acquisitions, so two
    /// callers racing on a miss may both compute.
    pub fn compute_if_absent_from_artifacts<'a, I>(
        &self,
        key: &str,
        artifacts: I,
    ) -> ForkboxResult<Classpath>
    where
        I: IntoIterator<Item = &'a Artifact>,
    {
        if let Some(cached) = self.get(key) {
            debug!("Classpath cache hit: {}", key);
            return Ok(cached);
        }

        debug!("Classpath cache miss: {}", key);
        let files = artifacts
            .into_iter()
            .map(|artifact| absolute_path_string(&artifact.file))
            .collect::<ForkboxResult<Vec<_>>>()?;

        let classpath = Classpath::new(files);
        self.put(key, classpath.clone());
        Ok(classpath)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

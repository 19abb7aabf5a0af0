//! forkbox - run JVM test forks inside containers
//!
//! Caches resolved classpaths and translates a host-side test environment
//! (classpath, working directory, package repository) into a container
//! command, either inline or through a helper script.

pub mod classpath;
pub mod cli;
pub mod config;
pub mod error;
pub mod orchestration;

pub use error::{ForkboxError, ForkboxResult};

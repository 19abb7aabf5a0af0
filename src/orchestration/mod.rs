//! Container invocation for test forks
//!
//! Turns a host-side test environment into a container command:
//! - path bindings and translation of host paths
//! - classpath rewriting
//! - ordered command assembly (batch or helper script)
//! - helper script lifecycle

pub mod assembler;
pub mod binding;
mod factory;
pub mod rewrite;
pub mod script;

pub use assembler::{AssembledCommand, CommandAssembler, ContainerInvocationSpec, OutputMode};
pub use binding::{translate, translate_url_path, BindingRole, PathBinding};
pub use factory::{create_assembler, Platform};
pub use rewrite::rewrite_classpath;
pub use script::{ScriptLifecycle, ScriptStatus};

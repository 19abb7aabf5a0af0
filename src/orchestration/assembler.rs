//! Container command assembly
//!
//! The command is built from fragments that must be appended in this order:
//!
//! 1. run token (`docker run --rm `)
//! 2. one `--mount` per binding, repository first
//! 3. image
//! 4. shell entry (`cd` into the project, start Xvfb, export `DISPLAY`)
//! 5. any number of caller commands
//!
//! In batch mode the fragments only accumulate in memory. In script mode
//! each fragment is also appended to the fork's helper script as soon as it
//! is produced. Fragments appended out of order are rejected, never
//! reordered.

use crate::error::{ForkboxError, ForkboxResult};
use crate::orchestration::binding::{BindingRole, PathBinding};
use crate::orchestration::script::{script_file_name, ScriptLifecycle};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// Container runtime used when none is configured
pub const DEFAULT_RUNTIME: &str = "docker";

/// X display the virtual framebuffer listens on
pub const VIRTUAL_DISPLAY: &str = ":1";

/// How the assembled command reaches the host shell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Pick from the host platform
    #[default]
    Auto,
    /// Return the whole command as one string
    Batch,
    /// Stream fragments into a helper script
    Script,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Batch => write!(f, "batch"),
            Self::Script => write!(f, "script"),
        }
    }
}

/// Everything needed to describe one fork's container invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInvocationSpec {
    /// Runtime executable (`docker`, `podman`)
    pub runtime: String,
    pub image: String,
    /// Mount and rewrite rules, in match priority order
    pub bindings: Vec<PathBinding>,
    pub project_name: String,
    pub fork_number: u32,
}

impl ContainerInvocationSpec {
    pub fn new(
        image: impl Into<String>,
        project_name: impl Into<String>,
        bindings: Vec<PathBinding>,
    ) -> Self {
        Self {
            runtime: DEFAULT_RUNTIME.to_string(),
            image: image.into(),
            bindings,
            project_name: project_name.into(),
            fork_number: 0,
        }
    }

    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = runtime.into();
        self
    }

    pub fn with_fork_number(mut self, fork_number: u32) -> Self {
        self.fork_number = fork_number;
        self
    }

    /// First binding with the given role
    pub fn binding(&self, role: BindingRole) -> ForkboxResult<&PathBinding> {
        self.bindings
            .iter()
            .find(|b| b.role == role)
            .ok_or(ForkboxError::MissingBinding(role.as_str()))
    }

    /// Project directory inside the container
    pub fn container_workdir(&self) -> ForkboxResult<String> {
        let worktree = self.binding(BindingRole::Worktree)?;
        Ok(format!(
            "{}/{}",
            worktree.container_path.trim_end_matches('/'),
            self.project_name
        ))
    }

    /// Helper script file name for this fork
    pub fn script_file_name(&self) -> String {
        script_file_name(&self.project_name, self.fork_number)
    }
}

/// Assembly progress, in the only order fragments may arrive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Empty,
    Run,
    Mounts,
    Image,
    Shell,
}

/// Finished command, ready for the caller to execute
#[derive(Debug)]
pub enum AssembledCommand {
    /// Whole command line for direct invocation
    Inline(String),
    /// Closed helper script holding the command. The caller deletes it
    /// once the fork has finished.
    Script(ScriptLifecycle),
}

/// Builds one fork's container command, fragment by fragment
#[derive(Debug)]
pub struct CommandAssembler {
    spec: ContainerInvocationSpec,
    stage: Stage,
    command: String,
    script: Option<ScriptLifecycle>,
}

impl CommandAssembler {
    /// Assembler that keeps the command in memory
    pub fn batch(spec: ContainerInvocationSpec) -> Self {
        Self {
            spec,
            stage: Stage::Empty,
            command: String::new(),
            script: None,
        }
    }

    /// Assembler that streams fragments into `<script_dir>/<project><fork>DockerCommandLine.bat`
    pub fn script(spec: ContainerInvocationSpec, script_dir: &Path) -> ForkboxResult<Self> {
        let script =
            ScriptLifecycle::for_fork(script_dir, &spec.project_name, spec.fork_number)?;
        Ok(Self {
            spec,
            stage: Stage::Empty,
            command: String::new(),
            script: Some(script),
        })
    }

    pub fn spec(&self) -> &ContainerInvocationSpec {
        &self.spec
    }

    pub fn mode(&self) -> OutputMode {
        if self.script.is_some() {
            OutputMode::Script
        } else {
            OutputMode::Batch
        }
    }

    /// Everything appended so far, in both modes
    pub fn command_text(&self) -> &str {
        &self.command
    }

    /// Path of the helper script, in script mode
    pub fn script_path(&self) -> Option<&Path> {
        self.script.as_ref().map(ScriptLifecycle::path)
    }

    /// `docker run --rm `
    pub fn add_run(&mut self) -> ForkboxResult<()> {
        self.check_order("run", &[Stage::Empty], "the first fragment")?;
        let fragment = format!("{} run --rm ", self.spec.runtime);
        self.push(&fragment, Stage::Run)
    }

    /// Mount for the binding with `role`
    pub fn add_mount(&mut self, role: BindingRole) -> ForkboxResult<()> {
        let binding = self.spec.binding(role)?.clone();
        self.add_binding_mount(&binding)
    }

    pub fn add_repository_mount(&mut self) -> ForkboxResult<()> {
        self.add_mount(BindingRole::Repository)
    }

    pub fn add_worktree_mount(&mut self) -> ForkboxResult<()> {
        self.add_mount(BindingRole::Worktree)
    }

    /// `--mount type=bind,source="<host>",target="<container>" `
    pub fn add_binding_mount(&mut self, binding: &PathBinding) -> ForkboxResult<()> {
        self.check_order(
            "mount",
            &[Stage::Run, Stage::Mounts],
            "a mount right after the run token",
        )?;
        self.push(
            &mount_fragment(&binding.host_path, &binding.container_path),
            Stage::Mounts,
        )
    }

    /// `<image> `
    pub fn add_image(&mut self) -> ForkboxResult<()> {
        self.check_order(
            "image",
            &[Stage::Run, Stage::Mounts],
            "the image after the run token and mounts",
        )?;
        let fragment = format!("{} ", self.spec.image);
        self.push(&fragment, Stage::Image)
    }

    /// ` bin/bash -c "cd <workdir>; Xvfb :1 & export DISPLAY=:1; `
    ///
    /// The quote stays open for the caller's commands.
    pub fn add_change_to_workdir(&mut self) -> ForkboxResult<()> {
        let workdir = self.spec.container_workdir()?;
        self.check_order(
            "shell entry",
            &[Stage::Image],
            "the shell entry right after the image",
        )?;
        self.push(&shell_entry_fragment(&workdir), Stage::Shell)
    }

    /// Append caller text inside the shell entry's open quote
    pub fn append_command(&mut self, text: &str) -> ForkboxResult<()> {
        self.check_order(
            "command",
            &[Stage::Shell],
            "commands only after the shell entry",
        )?;
        self.push(text, Stage::Shell)
    }

    /// Append the run token, every binding's mount in order, the image and
    /// the shell entry.
    pub fn assemble(&mut self) -> ForkboxResult<()> {
        // Fail before writing anything if the workdir cannot be derived
        self.spec.container_workdir()?;

        self.add_run()?;
        let bindings = self.spec.bindings.clone();
        for binding in &bindings {
            self.add_binding_mount(binding)?;
        }
        self.add_image()?;
        self.add_change_to_workdir()
    }

    /// Finish assembly. Script mode closes the script and hands it over.
    ///
    /// A script that fails to close is removed before the error is returned.
    pub fn finish(mut self) -> ForkboxResult<AssembledCommand> {
        match self.script.take() {
            Some(mut script) => match script.close() {
                Ok(()) => Ok(AssembledCommand::Script(script)),
                Err(e) => {
                    if let Err(cleanup) = script.delete() {
                        warn!("Failed to remove script {}: {}", script.path().display(), cleanup);
                    }
                    Err(e)
                }
            },
            None => Ok(AssembledCommand::Inline(std::mem::take(&mut self.command))),
        }
    }

    /// Drop a partly assembled command. Script mode removes the script file.
    pub fn discard(&mut self) -> ForkboxResult<()> {
        if let Some(script) = self.script.as_mut() {
            script.delete()?;
        }
        self.command.clear();
        self.stage = Stage::Empty;
        Ok(())
    }

    fn check_order(
        &self,
        fragment: &'static str,
        allowed: &[Stage],
        expected: &'static str,
    ) -> ForkboxResult<()> {
        if allowed.contains(&self.stage) {
            Ok(())
        } else {
            Err(ForkboxError::FragmentOrder { fragment, expected })
        }
    }

    /// The stage only moves once the fragment is written
    fn push(&mut self, fragment: &str, next: Stage) -> ForkboxResult<()> {
        if let Some(script) = self.script.as_mut() {
            script.write(fragment)?;
        }
        debug!("Appended fragment: {}", fragment.trim_end());
        self.command.push_str(fragment);
        self.stage = next;
        Ok(())
    }
}

/// Bind-mount clause for one host directory
pub fn mount_fragment(source: &str, target: &str) -> String {
    format!(
        "--mount type=bind,source=\"{}\",target=\"{}\" ",
        source, target
    )
}

/// Shell entry that enters `workdir` and starts a virtual display
pub fn shell_entry_fragment(workdir: &str) -> String {
    format!(
        " bin/bash -c \"cd {}; Xvfb {} & export DISPLAY={}; ",
        workdir, VIRTUAL_DISPLAY, VIRTUAL_DISPLAY
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestration::script::ScriptStatus;
    use std::fs;
    use tempfile::TempDir;

    fn demo_spec() -> ContainerInvocationSpec {
        ContainerInvocationSpec::new(
            "openjdk:11",
            "demo",
            vec![
                PathBinding::repository("/host/repo"),
                PathBinding::worktree("/host/proj"),
            ],
        )
    }

    const DEMO_COMMAND: &str = concat!(
        "docker run --rm ",
        "--mount type=bind,source=\"/host/repo\",target=\"/repository\" ",
        "--mount type=bind,source=\"/host/proj\",target=\"/workspace\" ",
        "openjdk:11 ",
        " bin/bash -c \"cd /workspace/demo; Xvfb :1 & export DISPLAY=:1; ",
    );

    #[test]
    fn batch_assembles_in_order() {
        let mut assembler = CommandAssembler::batch(demo_spec());
        assembler.assemble().unwrap();

        match assembler.finish().unwrap() {
            AssembledCommand::Inline(command) => {
                assert_eq!(command, DEMO_COMMAND);
                assert!(command.ends_with("cd /workspace/demo; Xvfb :1 & export DISPLAY=:1; "));
            }
            AssembledCommand::Script(_) => panic!("expected inline command"),
        }
    }

    #[test]
    fn step_by_step_matches_assemble() {
        let mut assembler = CommandAssembler::batch(demo_spec());
        assembler.add_run().unwrap();
        assembler.add_repository_mount().unwrap();
        assembler.add_worktree_mount().unwrap();
        assembler.add_image().unwrap();
        assembler.add_change_to_workdir().unwrap();

        assert_eq!(assembler.command_text(), DEMO_COMMAND);
        assert_eq!(assembler.mode(), OutputMode::Batch);
        assert!(assembler.script_path().is_none());
    }

    #[test]
    fn script_mode_streams_every_fragment() {
        let dir = TempDir::new().unwrap();
        let mut assembler = CommandAssembler::script(demo_spec(), dir.path()).unwrap();

        assembler.add_run().unwrap();
        let path = assembler.script_path().unwrap().to_path_buf();
        assert!(path.exists());
        assert!(path.ends_with("demo0DockerCommandLine.bat"));

        assembler.add_repository_mount().unwrap();
        assembler.add_worktree_mount().unwrap();
        assembler.add_image().unwrap();
        assembler.add_change_to_workdir().unwrap();
        assembler.append_command("java -version\"").unwrap();

        let AssembledCommand::Script(mut script) = assembler.finish().unwrap() else {
            panic!("expected script");
        };
        assert_eq!(script.status(), ScriptStatus::Closed);

        let expected = format!("{}java -version\"", DEMO_COMMAND);
        assert_eq!(fs::read_to_string(script.path()).unwrap(), expected);

        script.delete().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn script_name_uses_fork_number() {
        let dir = TempDir::new().unwrap();
        let spec = demo_spec().with_fork_number(2);
        let assembler = CommandAssembler::script(spec, dir.path()).unwrap();

        assert!(assembler
            .script_path()
            .unwrap()
            .ends_with("demo2DockerCommandLine.bat"));
        assert_eq!(assembler.mode(), OutputMode::Script);
    }

    #[test]
    fn custom_runtime_and_trailing_slash() {
        let spec = ContainerInvocationSpec::new(
            "fedora:41",
            "svc",
            vec![PathBinding::new(BindingRole::Worktree, "/src", "/work/")],
        )
        .with_runtime("podman");
        let mut assembler = CommandAssembler::batch(spec);
        assembler.assemble().unwrap();

        assert_eq!(
            assembler.command_text(),
            "podman run --rm --mount type=bind,source=\"/src\",target=\"/work/\" fedora:41  bin/bash -c \"cd /work/svc; Xvfb :1 & export DISPLAY=:1; "
        );
    }

    #[test]
    fn missing_repository_binding_fails() {
        let spec = ContainerInvocationSpec::new(
            "openjdk:11",
            "demo",
            vec![PathBinding::worktree("/host/proj")],
        );
        let mut assembler = CommandAssembler::batch(spec);
        assembler.add_run().unwrap();

        let err = assembler.add_repository_mount().unwrap_err();
        assert!(matches!(err, ForkboxError::MissingBinding("repository")));
        assert_eq!(assembler.command_text(), "docker run --rm ");
    }

    #[test]
    fn missing_worktree_fails_before_writing() {
        let dir = TempDir::new().unwrap();
        let spec = ContainerInvocationSpec::new(
            "openjdk:11",
            "demo",
            vec![PathBinding::repository("/host/repo")],
        );
        let mut assembler = CommandAssembler::script(spec, dir.path()).unwrap();

        let err = assembler.assemble().unwrap_err();

        assert!(matches!(err, ForkboxError::MissingBinding("worktree")));
        assert!(!assembler.script_path().unwrap().exists());
    }

    #[test]
    fn out_of_order_fragments_are_rejected() {
        let mut assembler = CommandAssembler::batch(demo_spec());
        let err = assembler.add_image().unwrap_err();
        assert!(matches!(err, ForkboxError::FragmentOrder { fragment: "image", .. }));

        assembler.add_run().unwrap();
        assembler.add_image().unwrap();
        let err = assembler.add_repository_mount().unwrap_err();
        assert!(matches!(err, ForkboxError::FragmentOrder { fragment: "mount", .. }));

        let err = assembler.add_run().unwrap_err();
        assert!(matches!(err, ForkboxError::FragmentOrder { fragment: "run", .. }));

        let err = assembler.append_command("ls").unwrap_err();
        assert!(matches!(err, ForkboxError::FragmentOrder { fragment: "command", .. }));

        // Rejected fragments leave no trace
        assert_eq!(assembler.command_text(), "docker run --rm openjdk:11 ");
    }

    #[test]
    fn failed_write_keeps_stage() {
        let dir = TempDir::new().unwrap();
        let scripts = dir.path().join("later");
        let mut assembler = CommandAssembler::script(demo_spec(), &scripts).unwrap();

        let err = assembler.add_run().unwrap_err();
        assert!(matches!(err, ForkboxError::Io { .. }));
        assert_eq!(assembler.command_text(), "");

        fs::create_dir(&scripts).unwrap();
        assembler.assemble().unwrap();

        let AssembledCommand::Script(script) = assembler.finish().unwrap() else {
            panic!("expected script");
        };
        assert_eq!(fs::read_to_string(script.path()).unwrap(), DEMO_COMMAND);
    }

    #[test]
    fn discard_removes_partial_script() {
        let dir = TempDir::new().unwrap();
        let mut assembler = CommandAssembler::script(demo_spec(), dir.path()).unwrap();
        assembler.add_run().unwrap();
        assembler.add_repository_mount().unwrap();
        let path = assembler.script_path().unwrap().to_path_buf();
        assert!(path.exists());

        assembler.discard().unwrap();

        assert!(!path.exists());
        assert_eq!(assembler.command_text(), "");
        assembler.add_run().unwrap();
    }

    #[test]
    fn image_may_follow_run_without_mounts() {
        let mut assembler = CommandAssembler::batch(demo_spec());
        assembler.add_run().unwrap();
        assembler.add_image().unwrap();
        assembler.add_change_to_workdir().unwrap();
        assert!(assembler.command_text().starts_with("docker run --rm openjdk:11 "));
    }

    #[test]
    fn container_workdir_joins_project() {
        assert_eq!(demo_spec().container_workdir().unwrap(), "/workspace/demo");
        assert_eq!(demo_spec().script_file_name(), "demo0DockerCommandLine.bat");
    }

    #[test]
    fn fragment_shapes() {
        assert_eq!(
            mount_fragment("C:\\Users\\dev\\.m2", "/repository"),
            "--mount type=bind,source=\"C:\\Users\\dev\\.m2\",target=\"/repository\" "
        );
        assert_eq!(
            shell_entry_fragment("/workspace/demo"),
            " bin/bash -c \"cd /workspace/demo; Xvfb :1 & export DISPLAY=:1; "
        );
    }

    #[test]
    fn output_mode_serde() {
        let mode: OutputMode = serde_json::from_str("\"script\"").unwrap();
        assert_eq!(mode, OutputMode::Script);
        assert_eq!(OutputMode::default(), OutputMode::Auto);
        assert_eq!(OutputMode::Batch.to_string(), "batch");
    }
}

//! Integration tests for forkbox

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    const DEMO_COMMAND: &str = concat!(
        "docker run --rm ",
        "--mount type=bind,source=\"/host/repo\",target=\"/repository\" ",
        "--mount type=bind,source=\"/host/proj\",target=\"/workspace\" ",
        "openjdk:11 ",
        " bin/bash -c \"cd /workspace/demo; Xvfb :1 & export DISPLAY=:1; ",
    );

    /// Binary pointed at a config file inside `dir`, isolated from the user's config
    fn forkbox(dir: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("forkbox");
        cmd.env("FORKBOX_CONFIG", dir.path().join("config.toml"));
        cmd
    }

    #[test]
    fn help_displays() {
        let dir = TempDir::new().unwrap();
        forkbox(&dir)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Run JVM integration-test forks"));
    }

    #[test]
    fn version_displays() {
        let dir = TempDir::new().unwrap();
        forkbox(&dir)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("forkbox"));
    }

    #[test]
    fn batch_command_prints_full_invocation() {
        let dir = TempDir::new().unwrap();
        forkbox(&dir)
            .args([
                "command",
                "--project",
                "demo",
                "--repository",
                "/host/repo",
                "--worktree",
                "/host/proj",
                "--image",
                "openjdk:11",
                "--mode",
                "batch",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains(DEMO_COMMAND));
    }

    #[test]
    fn batch_command_appends_test_command() {
        let dir = TempDir::new().unwrap();
        forkbox(&dir)
            .args([
                "command",
                "-p",
                "demo",
                "-r",
                "/host/repo",
                "-w",
                "/host/proj",
                "--mode",
                "batch",
                "--",
                "mvn",
                "verify",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("export DISPLAY=:1; mvn verify\""));
    }

    #[test]
    fn script_command_writes_script_and_prints_path() {
        let dir = TempDir::new().unwrap();
        let scripts = dir.path().join("scripts");
        fs::create_dir(&scripts).unwrap();

        forkbox(&dir)
            .args([
                "command",
                "--project",
                "demo",
                "--repository",
                "/host/repo",
                "--worktree",
                "/host/proj",
                "--image",
                "openjdk:11",
                "--fork",
                "3",
                "--mode",
                "script",
                "--script-dir",
            ])
            .arg(&scripts)
            .assert()
            .success()
            .stdout(predicate::str::contains("demo3DockerCommandLine.bat"));

        let content = fs::read_to_string(scripts.join("demo3DockerCommandLine.bat")).unwrap();
        assert_eq!(content, DEMO_COMMAND);
    }

    #[test]
    fn script_dir_must_exist() {
        let dir = TempDir::new().unwrap();
        forkbox(&dir)
            .args(["command", "-p", "demo", "-m", "script", "--script-dir"])
            .arg(dir.path().join("missing"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("creating script"));
    }

    #[test]
    fn config_values_are_used() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("config.toml"),
            r#"
                [container]
                runtime = "podman"
                image = "maven:3"
                mode = "batch"

                [paths]
                repository = "/srv/m2"
                worktree = "/srv/src"
            "#,
        )
        .unwrap();

        forkbox(&dir)
            .args(["command", "-p", "svc"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("podman run --rm "))
            .stdout(predicate::str::contains("source=\"/srv/m2\",target=\"/repository\""))
            .stdout(predicate::str::contains("maven:3  bin/bash -c \"cd /workspace/svc;"));
    }

    #[test]
    fn invalid_config_fails_with_hint() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "[container\n").unwrap();

        forkbox(&dir)
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"))
            .stderr(predicate::str::contains("forkbox config init --force"));
    }

    #[test]
    fn relative_mount_in_config_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("config.toml"),
            "[container]\nworkspace_mount = \"workspace\"\n",
        )
        .unwrap();

        forkbox(&dir)
            .args(["command", "-p", "demo", "-m", "batch"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("container.workspace_mount"))
            .stderr(predicate::str::contains("forkbox config init --force"));
    }

    #[test]
    fn config_init_force_repairs_invalid_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[container\n").unwrap();

        forkbox(&dir)
            .args(["config", "init", "--force"])
            .assert()
            .success();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("[container]"));
    }

    #[cfg(unix)]
    #[test]
    fn rewrite_translates_entries_in_order() {
        let dir = TempDir::new().unwrap();
        forkbox(&dir)
            .args([
                "rewrite",
                "--repository",
                "/host/repo",
                "--worktree",
                "/host/proj",
                "--format",
                "lines",
                "/host/proj/demo/target/classes:/host/repo/org/a.jar",
                "/opt/extra.jar",
            ])
            .assert()
            .success()
            .stdout(
                "/workspace/demo/target/classes\n/repository/org/a.jar\n/opt/extra.jar\n",
            );
    }

    #[cfg(unix)]
    #[test]
    fn rewrite_json_output() {
        let dir = TempDir::new().unwrap();
        let output = forkbox(&dir)
            .args([
                "rewrite",
                "-r",
                "/host/repo",
                "-w",
                "/host/proj",
                "--format",
                "json",
                "/host/repo/a.jar",
            ])
            .output()
            .unwrap();

        assert!(output.status.success());
        let parsed: Vec<String> = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(parsed, vec!["/repository/a.jar"]);
    }

    #[cfg(unix)]
    #[test]
    fn rewrite_with_relative_worktree() {
        let dir = TempDir::new().unwrap();
        let cwd = dir.path().canonicalize().unwrap();
        let entry = cwd.join("lib").join("a.jar");

        forkbox(&dir)
            .current_dir(&cwd)
            .args(["rewrite", "-r", "/host/repo", "-w", ".", "--format", "lines"])
            .arg(&entry)
            .assert()
            .success()
            .stdout("/workspace/lib/a.jar\n");
    }

    #[cfg(unix)]
    #[test]
    fn batch_command_mounts_absolute_worktree() {
        let dir = TempDir::new().unwrap();
        let cwd = dir.path().canonicalize().unwrap();

        forkbox(&dir)
            .current_dir(&cwd)
            .args(["command", "-p", "demo", "-r", "/host/repo", "-w", ".", "-m", "batch"])
            .assert()
            .success()
            .stdout(predicate::str::contains(format!(
                "source=\"{}\",target=\"/workspace\"",
                cwd.display()
            )));
    }

    #[test]
    fn config_path() {
        let dir = TempDir::new().unwrap();
        forkbox(&dir)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show_defaults() {
        let dir = TempDir::new().unwrap();
        forkbox(&dir)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[general]"))
            .stdout(predicate::str::contains("image = \"openjdk:11\""));
    }

    #[test]
    fn config_init_writes_file_once() {
        let dir = TempDir::new().unwrap();

        forkbox(&dir)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration initialized"));
        assert!(dir.path().join("config.toml").exists());

        forkbox(&dir)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Config already exists"));
    }
}

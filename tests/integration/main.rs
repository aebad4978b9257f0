//! Integration tests for nx-matrix

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;

    /// Binary with every CI input cleared, so the host environment can't leak in
    pub fn nx_matrix() -> Command {
        let mut cmd = cargo_bin_cmd!("nx-matrix");
        for var in [
            "INPUT_TARGETS",
            "INPUT_MAXDISTRIBUTION",
            "INPUT_WORKINGDIRECTORY",
            "INPUT_DEBUG",
            "INPUT_ARGS",
            "INPUT_TARGET",
            "INPUT_DISTRIBUTION",
            "NX_BASE",
            "NX_HEAD",
            "NX_MATRIX_CONFIG",
            "NX_MATRIX_CACHE_DIR",
            "GITHUB_OUTPUT",
        ] {
            cmd.env_remove(var);
        }
        cmd
    }

    #[test]
    fn help_displays() {
        nx_matrix()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Distribute nx affected projects"));
    }

    #[test]
    fn version_displays() {
        nx_matrix()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("nx-matrix"));
    }

    #[test]
    fn matrix_without_targets_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        nx_matrix()
            .args(["matrix", "--working-directory"])
            .arg(dir.path())
            .assert()
            .failure()
            .stdout(predicate::str::contains("::error::No targets given"));
    }

    #[test]
    fn matrix_without_nx_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        nx_matrix()
            .args(["matrix", "--targets", "test", "--working-directory"])
            .arg(dir.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("Couldn't find Nx binary"))
            .stderr(predicate::str::contains("npm/yarn install"));
    }

    #[test]
    fn cache_keys_to_stdout() {
        nx_matrix()
            .args([
                "cache-keys",
                "--target",
                "test",
                "--distribution",
                "2",
                "--platform",
                "linux",
                "--arch",
                "x64",
            ])
            .assert()
            .success()
            .stdout(
                predicate::str::is_match(r"primaryKey=linux-x64-\d{4}-\d{1,2}-test-2\n").unwrap(),
            )
            .stdout(
                predicate::str::is_match(
                    r"restoreKeys<<(\S+)\nlinux-x64-\d{4}-\d{1,2}-test\nlinux-x64-\d{4}-\d{1,2}\n",
                )
                .unwrap(),
            );
    }

    #[test]
    fn cache_keys_rejects_zero_bucket() {
        nx_matrix()
            .args(["cache-keys", "--target", "test", "--distribution", "0"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid cache key part"));
    }
}

#[cfg(unix)]
mod workspace_tests {
    use super::cli_tests::nx_matrix;
    use predicates::prelude::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Workspace with a fake nx that logs its arguments and prints `projects`
    fn workspace(projects: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        let bin = dir.path().join("node_modules/.bin");
        std::fs::create_dir_all(&bin).unwrap();

        let script = bin.join("nx");
        std::fs::write(
            &script,
            format!("#!/bin/sh\necho \"$@\" >> calls.log\necho '{}'\n", projects),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
        dir
    }

    fn calls(dir: &Path) -> Vec<String> {
        std::fs::read_to_string(dir.join("calls.log"))
            .map(|s| s.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn output_file(dir: &Path) -> PathBuf {
        dir.join("github_output")
    }

    #[test]
    fn emits_matrix_and_has_changes() {
        let ws = workspace("project1, project2, project3, project4");
        let output = output_file(ws.path());

        nx_matrix()
            .env("INPUT_TARGETS", "test,build")
            .env("INPUT_MAXDISTRIBUTION", "2")
            .env("INPUT_WORKINGDIRECTORY", ws.path())
            .env("GITHUB_OUTPUT", &output)
            .arg("matrix")
            .assert()
            .success()
            .stdout(predicate::str::contains("::group::Generating affected matrix for test,build"))
            .stdout(predicate::str::contains("::endgroup::"));

        let written = std::fs::read_to_string(&output).unwrap();
        let matrix_pos = written.find("matrix<<").unwrap();
        let changes_pos = written.find("hasChanges<<").unwrap();
        assert!(matrix_pos < changes_pos);
        assert!(written.contains(concat!(
            r#"{"include":["#,
            r#"{"target":"test","distribution":1,"projects":"project1,project2"},"#,
            r#"{"target":"test","distribution":2,"projects":"project3,project4"},"#,
            r#"{"target":"build","distribution":1,"projects":"project1,project2"},"#,
            r#"{"target":"build","distribution":2,"projects":"project3,project4"}"#,
            r#"]}"#
        )));
        assert!(written.contains("\ntrue\n"));

        assert_eq!(
            calls(ws.path()),
            vec![
                "print-affected --target=test --select=tasks.target.project",
                "print-affected --target=build --select=tasks.target.project",
            ]
        );
    }

    #[test]
    fn per_target_distribution_and_forwarded_args() {
        let ws = workspace("project1, project2, project3, project4");

        nx_matrix()
            .args(["matrix", "--targets", "test,build"])
            .args(["--distribution", r#"{"test": 2, "build": 1}"#])
            .args(["--base", "main", "--head", "HEAD"])
            .args(["--args", "--exclude=docs"])
            .arg("--working-directory")
            .arg(ws.path())
            .assert()
            .success()
            .stdout(predicate::str::contains(
                r#"{"target":"build","distribution":1,"projects":"project1,project2,project3,project4"}"#,
            ))
            .stdout(predicate::str::contains("hasChanges=true"));

        assert_eq!(
            calls(ws.path())[0],
            "print-affected --target=test --select=tasks.target.project --base=main --head=HEAD --exclude=docs"
        );
    }

    #[test]
    fn nothing_affected() {
        let ws = workspace("");

        nx_matrix()
            .args(["matrix", "--targets", "test", "--working-directory"])
            .arg(ws.path())
            .assert()
            .success()
            .stdout(predicate::str::contains(r#"matrix={"include":[]}"#))
            .stdout(predicate::str::contains("hasChanges=false"));
    }

    #[test]
    fn missing_distribution_fails_before_nx_runs() {
        let ws = workspace("project1");

        nx_matrix()
            .args(["matrix", "--targets", "test,build"])
            .args(["--distribution", r#"{"test": 2}"#])
            .arg("--working-directory")
            .arg(ws.path())
            .assert()
            .failure()
            .stdout(predicate::str::contains("::error::Missing distribution for target: build"))
            .stdout(predicate::str::contains("matrix=").not());

        assert!(calls(ws.path()).is_empty());
    }

    #[test]
    fn failing_nx_aborts_without_outputs() {
        let ws = TempDir::new().unwrap();
        let bin = ws.path().join("node_modules/.bin");
        std::fs::create_dir_all(&bin).unwrap();
        let script = bin.join("nx");
        std::fs::write(&script, "#!/bin/sh\necho 'not a git repository' >&2\nexit 1\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        nx_matrix()
            .args(["matrix", "--targets", "test", "--working-directory"])
            .arg(ws.path())
            .assert()
            .failure()
            .stdout(predicate::str::contains("::error::Command failed"))
            .stdout(predicate::str::contains("hasChanges=").not());
    }

    #[test]
    fn config_file_sets_default_distribution() {
        let ws = workspace("a, b, c, d");
        std::fs::write(
            ws.path().join(".nx-matrix.toml"),
            "[matrix]\ndefault_distribution = 4\n",
        )
        .unwrap();

        nx_matrix()
            .args(["matrix", "--targets", "test", "--working-directory"])
            .arg(ws.path())
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""distribution":4,"projects":"d""#));
    }

    #[test]
    fn cache_save_and_restore() {
        let ws = TempDir::new().unwrap();
        let store = TempDir::new().unwrap();
        let nx_cache = ws.path().join("node_modules/.cache/nx");
        std::fs::create_dir_all(&nx_cache).unwrap();
        std::fs::write(nx_cache.join("run.json"), "{}").unwrap();

        let job = ["--target", "test", "--distribution", "1"];

        nx_matrix()
            .args(["cache", "save"])
            .args(job)
            .arg("--cache-dir")
            .arg(store.path())
            .arg("--working-directory")
            .arg(ws.path())
            .assert()
            .success();

        std::fs::remove_dir_all(&nx_cache).unwrap();

        // Different bucket: falls back to the same target
        nx_matrix()
            .args(["cache", "restore", "--target", "test", "--distribution", "2"])
            .arg("--cache-dir")
            .arg(store.path())
            .arg("--working-directory")
            .arg(ws.path())
            .assert()
            .success()
            .stdout(predicate::str::is_match(r"cacheHit=.*-test-1\n").unwrap());

        assert!(nx_cache.join("run.json").exists());
    }
}

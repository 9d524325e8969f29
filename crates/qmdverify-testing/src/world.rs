//! Isolated environment for running the `qmdverify` binary.

use anyhow::Result;
use assert_cmd::Command;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::server::StubServer;

/// Declarative test environment builder.
///
/// # Example
/// ```no_run
/// use qmdverify_testing::{StubServer, TestWorld};
///
/// let server = StubServer::start();
/// let world = TestWorld::new()
///     .with_server(&server)
///     .with_qmd("ui/toolbar.qmd");
///
/// let result = world.run(&["check", "ui/toolbar.qmd"]).unwrap();
/// assert!(result.success());
/// ```
pub struct TestWorld {
    temp_dir: TempDir,
    cwd: PathBuf,
    env_vars: HashMap<String, String>,
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorld {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_home = temp_dir.path().join(".config");
        std::fs::create_dir_all(&config_home).expect("Failed to create config dir");

        let mut env_vars = HashMap::new();
        // Keep the user's real config file out of the run.
        env_vars.insert(
            "QMDVERIFY_CONFIG".to_string(),
            config_home
                .join("qmdverify")
                .join("config.toml")
                .to_string_lossy()
                .to_string(),
        );

        Self {
            cwd: temp_dir.path().to_path_buf(),
            temp_dir,
            env_vars,
        }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Directory holding `qmdverify/config.toml` for this world; the CLI is
    /// pointed at that file through `QMDVERIFY_CONFIG`.
    pub fn config_home(&self) -> PathBuf {
        self.temp_dir.path().join(".config")
    }

    /// Point the CLI at a stub server via `QMDVERIFY_HOST`.
    pub fn with_server(self, server: &StubServer) -> Self {
        self.with_env("QMDVERIFY_HOST", server.url())
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Write a sample QMD file at `relative` under the working directory.
    pub fn with_qmd(self, relative: &str) -> Self {
        let stem = Path::new(relative)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        self.with_file(relative, &crate::fixtures::sample_qmd(&stem))
    }

    pub fn with_file(self, relative: &str, contents: &str) -> Self {
        let path = self.cwd.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dir");
        }
        std::fs::write(&path, contents).expect("Failed to write file");
        self
    }

    /// Write `qmdverify/config.toml` under the isolated config home.
    pub fn with_config(self, contents: &str) -> Self {
        let dir = self.config_home().join("qmdverify");
        std::fs::create_dir_all(&dir).expect("Failed to create config dir");
        std::fs::write(dir.join("config.toml"), contents).expect("Failed to write config");
        self
    }

    pub fn configure_command<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        cmd.current_dir(&self.cwd);
        cmd.env_remove("QMDVERIFY_HOST");
        cmd.env("NO_COLOR", "1");
        for (key, value) in &self.env_vars {
            cmd.env(key, value);
        }
        cmd
    }

    /// Run the `qmdverify` binary with `args`.
    #[allow(deprecated)]
    pub fn run(&self, args: &[&str]) -> Result<CliResult> {
        let mut cmd = Command::cargo_bin("qmdverify")
            .map_err(|e| anyhow::anyhow!("Failed to find qmdverify binary: {}", e))?;

        self.configure_command(&mut cmd);
        cmd.args(args);

        let output = cmd.output()?;

        Ok(CliResult {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Result of a CLI command execution.
#[derive(Debug)]
pub struct CliResult {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CliResult {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }

    pub fn json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::from_str(&self.stdout)?)
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }
}

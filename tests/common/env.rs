//! Test environment builder for isolated otelstack runs.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

use super::fixtures::{COLLECTOR_CONFIG_X, STACK_TOML, TEST_API_KEY};

/// Environment variables that would leak the caller's setup into a test
const SCRUBBED_ENV: &[&str] = &[
    "HONEYCOMB_API_KEY",
    "OTELSTACK_STACK",
    "OTELSTACK_LOCATION",
    "OTELSTACK_CONFIG_FILE",
    "OTELSTACK_AZ",
    "RUST_LOG",
    "GITHUB_ACTIONS",
];

/// Result of running an otelstack CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    /// Combine stdout and stderr
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

/// Isolated project directory with a stack config and a collector config
pub struct TestEnv {
    pub project_root: TempDir,
    bin: PathBuf,
    api_key: Option<String>,
    az: Option<PathBuf>,
}

impl TestEnv {
    /// Project with `otelstack.toml` and `config.yaml` in place
    pub fn new() -> Self {
        let env = Self::empty();
        env.write("otelstack.toml", STACK_TOML);
        env.write("config.yaml", COLLECTOR_CONFIG_X);
        env
    }

    /// Project directory with nothing in it
    pub fn empty() -> Self {
        Self {
            project_root: tempfile::tempdir().unwrap(),
            bin: PathBuf::from(env!("CARGO_BIN_EXE_otelstack")),
            api_key: Some(TEST_API_KEY.to_string()),
            az: None,
        }
    }

    /// Run without a Honeycomb key in the environment
    pub fn without_api_key(mut self) -> Self {
        self.api_key = None;
        self
    }

    /// Install the fake `az` and point the stack at it
    #[cfg(unix)]
    pub fn with_fake_az(mut self) -> Self {
        use std::os::unix::fs::PermissionsExt;

        let program = self.project_path("bin/az");
        fs::create_dir_all(program.parent().unwrap()).unwrap();
        fs::write(&program, super::fixtures::FAKE_AZ).unwrap();
        fs::set_permissions(&program, fs::Permissions::from_mode(0o755)).unwrap();
        self.az = Some(program);
        self
    }

    pub fn project_path(&self, relative: &str) -> PathBuf {
        self.project_root.path().join(relative)
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.project_path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.project_path(relative)).unwrap_or_default()
    }

    /// Arguments the fake `az` received, one invocation per line
    pub fn az_calls(&self) -> Vec<String> {
        self.read("bin/calls.log")
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Forget previously logged `az` calls
    pub fn clear_az_log(&self) {
        let _ = fs::remove_file(self.project_path("bin/calls.log"));
        let _ = fs::remove_file(self.project_path("bin/app.log"));
    }

    /// Run otelstack in this environment from project root
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_from(self.project_root.path(), args)
    }

    pub fn run_from(&self, cwd: &Path, args: &[&str]) -> TestResult {
        let mut cmd = Command::new(&self.bin);
        cmd.current_dir(cwd)
            .args(args)
            .env("NO_COLOR", "1")
            .env("TERM", "dumb")
            .env("CI", "true");
        for key in SCRUBBED_ENV {
            cmd.env_remove(key);
        }
        if let Some(key) = &self.api_key {
            cmd.env("HONEYCOMB_API_KEY", key);
        }
        if let Some(az) = &self.az {
            cmd.env("OTELSTACK_AZ", az);
        }

        let output = cmd.output().expect("failed to run otelstack");
        TestResult {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

//! Azure CLI adapters
//!
//! Everything that reaches Azure goes through the `az` program. Secret
//! arguments are masked whenever a command line is logged or reported, and
//! the storage key for file operations travels through the child's
//! environment instead of its argument list.

mod container_app;
mod provider;
mod upload;

pub use provider::AzCliProvider;
pub use upload::AzFileUploader;

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde_json::Value;
use tracing::debug;

use crate::domain::ports::{ProviderError, ProviderResult};
use crate::domain::value_objects::{Secret, Urn};

/// Exit status `az` uses when a `show` target does not exist
const EXIT_RESOURCE_NOT_FOUND: i32 = 3;

const MASK: &str = "***";

#[derive(Debug, Clone)]
enum Arg {
    Plain(String),
    Secret(Secret),
}

/// One `az` invocation
#[derive(Debug, Clone)]
pub struct AzCommand {
    args: Vec<Arg>,
    env: Vec<(String, Secret)>,
}

impl AzCommand {
    /// `az <words...>`, e.g. `AzCommand::new(["group", "create"])`
    pub fn new<'a>(words: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            args: words
                .into_iter()
                .map(|w| Arg::Plain(w.to_string()))
                .collect(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(Arg::Plain(arg.into()));
        self
    }

    /// `--flag value`
    pub fn opt(self, flag: &str, value: impl Into<String>) -> Self {
        self.arg(flag).arg(value)
    }

    pub fn path_opt(self, flag: &str, path: &Path) -> Self {
        self.opt(flag, path.to_string_lossy().into_owned())
    }

    /// `--flag <secret>`; masked in logs and errors
    pub fn secret_opt(mut self, flag: &str, value: &Secret) -> Self {
        self.args.push(Arg::Plain(flag.to_string()));
        self.args.push(Arg::Secret(value.clone()));
        self
    }

    /// Pass a secret through the child's environment
    pub fn env_secret(mut self, key: &str, value: &Secret) -> Self {
        self.env.push((key.to_string(), value.clone()));
        self
    }

    /// Command line with secret values masked
    pub fn display_args(&self) -> String {
        self.args
            .iter()
            .map(|a| match a {
                Arg::Plain(s) => s.as_str(),
                Arg::Secret(_) => MASK,
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn exposed_args(&self) -> impl Iterator<Item = &str> {
        self.args.iter().map(|a| match a {
            Arg::Plain(s) => s.as_str(),
            Arg::Secret(s) => s.expose(),
        })
    }
}

/// Runner for the `az` program
#[derive(Debug, Clone)]
pub struct AzCli {
    program: PathBuf,
}

impl AzCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run `command` and return its trimmed stdout
    pub fn run(&self, command: &AzCommand) -> ProviderResult<String> {
        let program = self.program.to_string_lossy().into_owned();
        debug!(command = %format!("{} {}", program, command.display_args()), "running");

        let mut cmd = Command::new(&self.program);
        cmd.args(command.exposed_args())
            .args(["--only-show-errors", "--output", "json"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in &command.env {
            cmd.env(key, value.expose());
        }

        let output = cmd.output().map_err(|source| ProviderError::Spawn {
            program: program.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(ProviderError::CommandFailed {
                program,
                args: command.display_args(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Run `command` and parse stdout as JSON (`null` when empty)
    pub fn run_json(&self, command: &AzCommand, urn: &Urn) -> ProviderResult<Value> {
        let stdout = self.run(command)?;
        if stdout.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&stdout).map_err(|e| ProviderError::InvalidResponse {
            urn: urn.clone(),
            message: e.to_string(),
        })
    }

    /// `run_json` for `show`-style commands, mapping a missing resource to
    /// `ProviderError::NotFound`
    pub fn show(&self, command: &AzCommand, urn: &Urn) -> ProviderResult<Value> {
        self.run_json(command, urn).map_err(|e| not_found_or(e, urn))
    }
}

/// Map `az`'s "resource not found" exit status to `NotFound`
pub(crate) fn not_found_or(err: ProviderError, urn: &Urn) -> ProviderError {
    match err {
        ProviderError::CommandFailed {
            code: Some(EXIT_RESOURCE_NOT_FOUND),
            ..
        } => ProviderError::NotFound { urn: urn.clone() },
        ProviderError::CommandFailed { ref stderr, .. }
            if stderr.contains("ResourceNotFound") || stderr.contains("could not be found") =>
        {
            ProviderError::NotFound { urn: urn.clone() }
        }
        other => other,
    }
}

/// String at JSON `pointer` in an `az` response
pub(crate) fn str_at(value: &Value, pointer: &str, urn: &Urn) -> ProviderResult<String> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ProviderError::InvalidResponse {
            urn: urn.clone(),
            message: format!("missing '{}' in response", pointer),
        })
}

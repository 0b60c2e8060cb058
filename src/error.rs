//! Error types for otelstack
//!
//! Uses `thiserror` for library errors; the binary wraps them in `anyhow`.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::ports::ProviderError;
use crate::domain::value_objects::{StepOp, Urn};

/// Result type alias for otelstack operations
pub type StackResult<T> = Result<T, StackError>;

/// Main error type for otelstack operations
#[derive(Error, Debug)]
pub enum StackError {
    /// The collector configuration file could not be read
    #[error("cannot read collector config {path}: {source}")]
    ConfigFileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The stack configuration (otelstack.toml) is malformed
    #[error("invalid stack config in {file}: {message}")]
    InvalidConfig { file: PathBuf, message: String },

    /// A required secret was neither in the environment nor in `[secrets]`
    #[error("missing required secret '{name}' (set the {name} environment variable or [secrets].{name})")]
    MissingSecret { name: String },

    /// A physical resource name violates provider naming rules
    #[error("invalid {kind} name '{name}': {reason}")]
    InvalidName {
        kind: String,
        name: String,
        reason: String,
    },

    /// The declared resources reference each other in a loop
    #[error("dependency cycle between: {members}")]
    DependencyCycle { members: String },

    /// A resource depends on something that was never declared
    #[error("{urn} depends on undeclared resource {dependency}")]
    UnknownDependency { urn: Urn, dependency: Urn },

    /// An output reference could not be resolved at apply time
    #[error("{urn} references missing output '{key}' of {source_urn}")]
    UnresolvedOutput {
        urn: Urn,
        source_urn: Urn,
        key: String,
    },

    /// State file could not be read or written
    #[error("state file {path}: {message}")]
    State { path: PathBuf, message: String },

    /// State file was written by an incompatible version
    #[error("state format incompatible (found version {found}, expected {expected}); remove or migrate the state file")]
    StateVersionMismatch { found: u32, expected: u32 },

    /// Another run holds the state lock
    #[error("state is locked by another run: {path}")]
    StateLocked { path: PathBuf },

    /// A provider or upload step failed; nothing after it was applied
    #[error("{op} {urn} failed: {source}")]
    StepFailed {
        urn: Urn,
        op: StepOp,
        #[source]
        source: ProviderError,
    },

    /// Outputs of an unchanged resource could not be read back
    #[error("reading outputs of {urn} failed: {source}")]
    ReadFailed {
        urn: Urn,
        #[source]
        source: ProviderError,
    },

    /// Ctrl-C was received between steps
    #[error("interrupted; state saved after the last completed step")]
    Interrupted,

    /// The user declined the confirmation prompt
    #[error("aborted by user")]
    Aborted,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

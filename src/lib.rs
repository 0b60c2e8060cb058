//! otelstack - declarative deployment of an OpenTelemetry collector to Azure
//!
//! Declares a small stack (resource group, storage account and file share,
//! the collector configuration upload, a container apps environment and the
//! collector app), diffs it against the last applied state and applies the
//! difference in dependency order. A change to the collector configuration
//! file alone is enough to re-upload it and roll a new app revision.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

// Re-exports for convenience
pub use application::{ConfigChangeDetector, DeployResult, DeployUseCase, Preview, RunKind};
pub use config::Config;
pub use error::{StackError, StackResult};

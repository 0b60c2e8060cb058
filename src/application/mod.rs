//! Application Layer
//!
//! Use cases that orchestrate the business flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `DeployUseCase` - preview, up, destroy and outputs of the collector stack
//!
//! ## Services
//!
//! - `ConfigChangeDetector` - digest of the collector configuration file

pub mod deploy;
mod detector;

pub use deploy::{DeployResult, DeployUseCase, PreparedRun, Preview, RunKind};
pub use detector::ConfigChangeDetector;

//! Deploy Module
//!
//! Orchestrates preview/up/destroy runs of the collector stack.
//!
//! ## Structure
//!
//! - `options` - Run kinds (`RunKind`)
//! - `result` - Result types (`Preview`, `PreparedRun`, `DeployResult`)
//! - `use_case` - Core use case logic (`DeployUseCase`)
//!
//! ## Usage
//!
//! ```ignore
//! use otelstack::application::deploy::DeployUseCase;
//!
//! let use_case = DeployUseCase::new(provider, uploader, state_repo);
//! let run = use_case.prepare_up(&config)?;
//! let result = use_case.apply(run)?;
//! ```

mod options;
mod result;
mod use_case;

pub use options::RunKind;
pub use result::{DeployResult, PreparedRun, Preview};
pub use use_case::DeployUseCase;

#[cfg(test)]
mod tests;

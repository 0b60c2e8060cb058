//! CloudProvider port - abstraction over the cloud control plane
//!
//! Implementations:
//! - `AzCliProvider` - drives the `az` command-line tool
//! - `InMemoryProvider` - in-process fake for tests

use thiserror::Error;

use crate::domain::entities::{MissingInput, Outputs, ResolvedResource, ResourceState};
use crate::domain::value_objects::Urn;

pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// External tool exited unsuccessfully
    #[error("`{program} {args}` exited with {}: {stderr}", code.map(|c| c.to_string()).unwrap_or_else(|| "signal".to_string()))]
    CommandFailed {
        program: String,
        /// Arguments with secret values replaced
        args: String,
        code: Option<i32>,
        stderr: String,
    },

    /// External tool could not be started
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{urn} is missing input '{key}'")]
    MissingInput { urn: Urn, key: String },

    #[error("unexpected response for {urn}: {message}")]
    InvalidResponse { urn: Urn, message: String },

    #[error("{urn} does not exist at the provider")]
    NotFound { urn: Urn },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl From<MissingInput> for ProviderError {
    fn from(m: MissingInput) -> Self {
        ProviderError::MissingInput {
            urn: m.urn,
            key: m.key,
        }
    }
}

/// Control-plane operations for every non-command resource kind.
///
/// Create and update return the resource's outputs; secret outputs (such as
/// storage account keys) are returned as `PropertyValue::Secret`.
pub trait CloudProvider {
    fn create(&self, resource: &ResolvedResource) -> ProviderResult<Outputs>;

    fn update(&self, resource: &ResolvedResource, prior: &ResourceState)
        -> ProviderResult<Outputs>;

    fn delete(&self, prior: &ResourceState) -> ProviderResult<()>;

    /// Re-read outputs of an existing resource, including secrets that state
    /// only holds as fingerprints
    fn read(&self, prior: &ResourceState) -> ProviderResult<Outputs>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ResourceKind;

    #[test]
    fn command_failed_display_uses_exit_code() {
        let err = ProviderError::CommandFailed {
            program: "az".to_string(),
            args: "group create --name rg".to_string(),
            code: Some(2),
            stderr: "quota exceeded".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "`az group create --name rg` exited with 2: quota exceeded"
        );
    }

    #[test]
    fn command_failed_display_without_code() {
        let err = ProviderError::CommandFailed {
            program: "az".to_string(),
            args: String::new(),
            code: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("signal"));
    }

    #[test]
    fn missing_input_converts() {
        let err: ProviderError = MissingInput {
            urn: Urn::new(ResourceKind::ResourceGroup, "resourceGroup"),
            key: "location".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "resource-group::resourceGroup is missing input 'location'"
        );
    }
}

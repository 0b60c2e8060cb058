//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod deploy_events;
pub mod file_uploader;
pub mod provider;
pub mod state_repository;

pub use deploy_events::{DeployEvent, DeployEventSink, NoopEventSink};
pub use file_uploader::{
    remote_file_name, FileUploader, RemoveRequest, UploadAction, UploadRequest,
};
pub use provider::{CloudProvider, ProviderError, ProviderResult};
pub use state_repository::{StateLock, StateRepository};

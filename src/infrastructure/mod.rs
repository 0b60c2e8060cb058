//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `az/` - Azure CLI provider and file uploader
//! - `events/` - NDJSON event sink
//! - `repositories/` - JSON state repository
//! - `memory` - In-memory provider, uploader and state store

pub mod az;
pub mod events;
pub mod memory;
pub mod repositories;

// Re-export for convenience
pub use az::{AzCli, AzCliProvider, AzCommand, AzFileUploader};
pub use events::JsonEventSink;
pub use memory::{InMemoryProvider, InMemoryStateRepository, RecordingUploader};
pub use repositories::JsonStateRepository;

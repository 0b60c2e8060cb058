//! Config change detection
//!
//! Hashes the collector configuration file and compares it with the digest
//! recorded by the last successful upload.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::domain::entities::StateSnapshot;
use crate::domain::services::CollectorStack;
use crate::domain::value_objects::{ContentHash, ResourceKind};
use crate::error::{StackError, StackResult};

pub struct ConfigChangeDetector;

impl ConfigChangeDetector {
    /// SHA-256 of the file's bytes. An unreadable file is fatal.
    pub fn digest(path: &Path) -> StackResult<ContentHash> {
        let unreadable = |source| StackError::ConfigFileUnreadable {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(unreadable)?;
        ContentHash::from_reader(BufReader::new(file)).map_err(unreadable)
    }

    /// Digest the upload trigger was last applied with, if any
    pub fn recorded(state: &StateSnapshot) -> Option<ContentHash> {
        let upload = state.get(&CollectorStack::urn(ResourceKind::UploadCommand))?;
        upload
            .inputs
            .get("triggers")?
            .as_array()?
            .first()?
            .as_str()
            .map(ContentHash::from)
    }

    /// Whether `current` differs from what was last uploaded (true when
    /// nothing has been uploaded yet)
    pub fn has_changed(current: &ContentHash, state: &StateSnapshot) -> bool {
        Self::recorded(state).as_ref() != Some(current)
    }
}

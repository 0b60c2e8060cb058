//! Config binding
//!
//! The collector reads its configuration from a mounted share, which the
//! container app's declared properties know nothing about. The binding
//! carries the digest of that file into two diffed places: the upload's
//! trigger and an environment variable on the container. A content change
//! then shows up as a property change on both.

use crate::domain::value_objects::{ContentHash, PropertyValue, Urn};

/// Environment variable carrying the configuration digest
pub const CONFIG_FILE_HASH: &str = "CONFIG_FILE_HASH";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigBinding {
    digest: ContentHash,
    applies_to: Urn,
}

impl ConfigBinding {
    pub fn new(digest: ContentHash, applies_to: Urn) -> Self {
        Self { digest, applies_to }
    }

    pub fn digest(&self) -> &ContentHash {
        &self.digest
    }

    /// The resource whose revision the digest forces
    pub fn applies_to(&self) -> &Urn {
        &self.applies_to
    }

    /// Trigger list for the upload command
    pub fn trigger(&self) -> PropertyValue {
        PropertyValue::list([PropertyValue::from(self.digest.as_str())])
    }

    /// `{ name = CONFIG_FILE_HASH, value = <hex> }` container env entry
    pub fn env_var(&self) -> PropertyValue {
        PropertyValue::map([
            ("name", PropertyValue::from(CONFIG_FILE_HASH)),
            ("value", PropertyValue::from(self.digest.hex())),
        ])
    }
}

//! Secret value object
//!
//! Holds a sensitive string. `Debug` and `Display` never print the value and
//! there is deliberately no `Serialize` impl; the only way to persist a secret
//! is through its fingerprint.
//!
//! The fingerprint is an unsalted sha256 of the value, so it is stable across
//! runs and machines without extra state. That keeps it opaque only for
//! high-entropy values: the two secrets this stack carries (the Honeycomb API
//! key and the storage account key) are random tokens, but a short or
//! guessable value could be recovered from the state file by brute force.
//! Keep `.otelstack/` out of version control.

use std::fmt;

use serde::{Deserialize, Deserializer};

use super::ContentHash;

const REDACTED: &str = "[secret]";

#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The plaintext. Call only where the value leaves the process
    /// (child-process environment, provider request body).
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Digest used in state and diffs in place of the value
    pub fn fingerprint(&self) -> ContentHash {
        ContentHash::from_bytes(self.0.as_bytes())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl<'de> Deserialize<'de> for Secret {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Secret)
    }
}

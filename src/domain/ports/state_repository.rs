//! StateRepository port - abstraction for state persistence
//!
//! Allows the application layer to load/save snapshots without knowing
//! about the file format or locking.

use std::fs::File;
use std::path::Path;

use crate::domain::entities::StateSnapshot;
use crate::error::StackResult;

/// Held for the duration of a run; dropping it releases the lock
#[derive(Debug)]
pub struct StateLock {
    _handle: Option<File>,
}

impl StateLock {
    /// Lock backed by an open, exclusively locked file
    pub fn file(handle: File) -> Self {
        Self {
            _handle: Some(handle),
        }
    }

    /// For repositories that need no cross-process lock
    pub fn none() -> Self {
        Self { _handle: None }
    }
}

pub trait StateRepository {
    /// Acquire the run lock for the state at `path`
    fn lock(&self, path: &Path) -> StackResult<StateLock>;

    /// Load the snapshot, or an empty one for `stack` if none exists yet
    fn load(&self, path: &Path, stack: &str) -> StackResult<StateSnapshot>;

    fn save(&self, state: &StateSnapshot, path: &Path) -> StackResult<()>;
}

//! JSON State Repository
//!
//! Persists the state snapshot at `<state_dir>/<stack>.json`. Writes go
//! through a temp file in the same directory and are renamed into place, so
//! a crash never leaves a half-written snapshot. A sibling `<stack>.lock`
//! file carries an exclusive advisory lock for the length of a run.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tempfile::NamedTempFile;

use crate::domain::entities::StateSnapshot;
use crate::domain::ports::{StateLock, StateRepository};
use crate::error::{StackError, StackResult};

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonStateRepository;

impl JsonStateRepository {
    pub fn new() -> Self {
        Self
    }

    pub fn lock_path(path: &Path) -> PathBuf {
        path.with_extension("lock")
    }
}

fn state_error(path: &Path, message: impl ToString) -> StackError {
    StackError::State {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

fn ensure_parent(path: &Path) -> StackResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| state_error(path, e))?;
    }
    Ok(())
}

impl StateRepository for JsonStateRepository {
    fn lock(&self, path: &Path) -> StackResult<StateLock> {
        let lock_path = Self::lock_path(path);
        ensure_parent(&lock_path)?;

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| state_error(&lock_path, e))?;
        file.try_lock_exclusive()
            .map_err(|_| StackError::StateLocked { path: lock_path })?;

        Ok(StateLock::file(file))
    }

    fn load(&self, path: &Path, stack: &str) -> StackResult<StateSnapshot> {
        if !path.exists() {
            return Ok(StateSnapshot::new(stack));
        }

        let content = fs::read_to_string(path).map_err(|e| state_error(path, e))?;
        let raw: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| state_error(path, e))?;

        let found = raw
            .get("version")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| state_error(path, "missing version"))?;
        if found != u64::from(StateSnapshot::VERSION) {
            return Err(StackError::StateVersionMismatch {
                found: u32::try_from(found).unwrap_or(u32::MAX),
                expected: StateSnapshot::VERSION,
            });
        }

        serde_json::from_value(raw).map_err(|e| state_error(path, e))
    }

    fn save(&self, state: &StateSnapshot, path: &Path) -> StackResult<()> {
        ensure_parent(path)?;
        let content = serde_json::to_string_pretty(state)?;

        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| state_error(path, e))?;
        tmp.write_all(content.as_bytes())
            .map_err(|e| state_error(path, e))?;
        tmp.write_all(b"\n").map_err(|e| state_error(path, e))?;
        tmp.as_file().sync_all().map_err(|e| state_error(path, e))?;
        tmp.persist(path).map_err(|e| state_error(path, e.error))?;
        Ok(())
    }
}

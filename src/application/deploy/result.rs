//! Deploy Result
//!
//! Result types for preview/up/destroy runs.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::domain::entities::{Resource, StateSnapshot};
use crate::domain::ports::StateLock;
use crate::domain::services::Plan;
use crate::domain::value_objects::{ContentHash, Fingerprint, StepOp, Urn};

use super::options::RunKind;

/// Outcome of `preview`: the plan, nothing applied
#[derive(Debug, Clone)]
pub struct Preview {
    pub plan: Plan,
    pub digest: ContentHash,
    /// Whether the digest differs from the last successful upload
    pub config_changed: bool,
}

/// A planned run, holding the state lock until it is applied or dropped
#[derive(Debug)]
pub struct PreparedRun {
    pub(super) kind: RunKind,
    pub(super) _lock: StateLock,
    pub(super) state_path: PathBuf,
    pub(super) state: StateSnapshot,
    pub(super) resources: Vec<Resource>,
    pub(super) plan: Plan,
    pub(super) digest: Option<ContentHash>,
}

impl PreparedRun {
    pub fn kind(&self) -> RunKind {
        self.kind
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// Configuration digest the plan was computed with (`None` for destroy)
    pub fn digest(&self) -> Option<&ContentHash> {
        self.digest.as_ref()
    }

    /// State as loaded before the run
    pub fn state(&self) -> &StateSnapshot {
        &self.state
    }

    pub fn state_path(&self) -> &PathBuf {
        &self.state_path
    }
}

/// Result of an applied run
#[derive(Debug, Clone)]
pub struct DeployResult {
    pub kind: RunKind,
    /// Steps that changed something, with the op actually executed
    pub changed: Vec<(Urn, StepOp)>,
    pub unchanged: Vec<Urn>,
    /// Stack outputs after the run
    pub outputs: BTreeMap<String, Fingerprint>,
    pub digest: Option<ContentHash>,
}

impl DeployResult {
    pub fn new(kind: RunKind, digest: Option<ContentHash>) -> Self {
        Self {
            kind,
            changed: Vec::new(),
            unchanged: Vec::new(),
            outputs: BTreeMap::new(),
            digest,
        }
    }

    pub fn has_changes(&self) -> bool {
        !self.changed.is_empty()
    }

    pub fn op_of(&self, urn: &Urn) -> Option<StepOp> {
        self.changed
            .iter()
            .find(|(u, _)| u == urn)
            .map(|(_, op)| *op)
    }

    pub fn count(&self, op: StepOp) -> usize {
        self.changed.iter().filter(|(_, o)| *o == op).count()
    }
}

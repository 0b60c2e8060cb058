//! What a deployment step does to one resource

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepOp {
    /// Not in state yet
    Create,
    /// In place
    Update,
    /// Delete, then create with the new inputs
    Replace,
    /// Nothing to do
    Same,
    /// In state but no longer declared (or destroying)
    Delete,
}

impl StepOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepOp::Create => "create",
            StepOp::Update => "update",
            StepOp::Replace => "replace",
            StepOp::Same => "same",
            StepOp::Delete => "delete",
        }
    }

    pub fn is_change(&self) -> bool {
        !matches!(self, StepOp::Same)
    }
}

impl fmt::Display for StepOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

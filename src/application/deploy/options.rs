//! Deploy Options
//!
//! Run kinds for preview/up/destroy.

/// What a run is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    /// Plan only; takes no lock and never calls the provider
    Preview,
    /// Bring the stack to the declaration
    Up,
    /// Delete everything recorded in state
    Destroy,
}

impl RunKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunKind::Preview => "preview",
            RunKind::Up => "up",
            RunKind::Destroy => "destroy",
        }
    }

    /// Whether the run needs the state lock
    pub fn locks_state(&self) -> bool {
        !matches!(self, RunKind::Preview)
    }
}

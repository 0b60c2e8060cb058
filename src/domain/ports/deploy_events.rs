//! Deploy Event Port
//!
//! Provides an observable interface for preview/up/destroy runs.
//! Enables progress reporting, JSON event streams, and debugging.

use crate::domain::value_objects::{ContentHash, StepOp, Urn};

/// Event emitted during a run
#[derive(Debug, Clone)]
pub enum DeployEvent {
    /// Run started
    Started {
        command: &'static str,
        stack: String,
        resource_count: usize,
    },

    /// Configuration digest computed
    ConfigHashed { path: String, hash: ContentHash },

    /// Plan computed
    Planned {
        creates: usize,
        updates: usize,
        replaces: usize,
        deletes: usize,
        unchanged: usize,
    },

    /// A step began executing
    StepStarted { index: usize, urn: Urn, op: StepOp },

    /// A step finished successfully
    StepCompleted { index: usize, urn: Urn, op: StepOp },

    /// A step failed; the run stops here
    StepFailed {
        index: usize,
        urn: Urn,
        op: StepOp,
        error: String,
    },

    /// A stack output was recorded
    Output { name: String, value: String },

    /// Run finished
    Completed { changed: usize, unchanged: usize },
}

/// Trait for receiving deploy events
///
/// Implementations:
/// - `ConsoleEventSink` (presentation): progress lines in the terminal
/// - `JsonEventSink`: NDJSON event stream for CI
/// - `NoopEventSink`: silent operation
pub trait DeployEventSink: Send + Sync {
    fn on_event(&self, event: DeployEvent);
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl DeployEventSink for NoopEventSink {
    fn on_event(&self, _event: DeployEvent) {}
}

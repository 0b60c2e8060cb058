//! JSON Event Sink
//!
//! Outputs run events as NDJSON for CI/automation consumption.

use crate::domain::ports::{DeployEvent, DeployEventSink};
use std::io::{self, Write};
use std::sync::Mutex;

/// Event sink that outputs NDJSON events to stdout
pub struct JsonEventSink {
    /// Mutex to ensure thread-safe writes
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonEventSink {
    /// Create a new JSON event sink writing to stdout
    pub fn stdout() -> Self {
        Self {
            writer: Mutex::new(Box::new(io::stdout())),
        }
    }

    /// Create a JSON event sink writing to a custom writer
    pub fn with_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    fn write_event(&self, event: serde_json::Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", event);
            let _ = writer.flush();
        }
    }
}

/// JSON form of one event
pub fn event_json(event: &DeployEvent) -> serde_json::Value {
    match event {
        DeployEvent::Started {
            command,
            stack,
            resource_count,
        } => serde_json::json!({
            "event": "start",
            "command": command,
            "stack": stack,
            "resource_count": resource_count,
        }),

        DeployEvent::ConfigHashed { path, hash } => serde_json::json!({
            "event": "config_hashed",
            "path": path,
            "hash": hash.as_str(),
        }),

        DeployEvent::Planned {
            creates,
            updates,
            replaces,
            deletes,
            unchanged,
        } => serde_json::json!({
            "event": "planned",
            "create": creates,
            "update": updates,
            "replace": replaces,
            "delete": deletes,
            "same": unchanged,
        }),

        DeployEvent::StepStarted { index, urn, op } => serde_json::json!({
            "event": "step_start",
            "index": index,
            "urn": urn.to_string(),
            "op": op.as_str(),
        }),

        DeployEvent::StepCompleted { index, urn, op } => serde_json::json!({
            "event": "step_done",
            "index": index,
            "urn": urn.to_string(),
            "op": op.as_str(),
        }),

        DeployEvent::StepFailed {
            index,
            urn,
            op,
            error,
        } => serde_json::json!({
            "event": "step_error",
            "index": index,
            "urn": urn.to_string(),
            "op": op.as_str(),
            "error": error,
        }),

        DeployEvent::Output { name, value } => serde_json::json!({
            "event": "output",
            "name": name,
            "value": value,
        }),

        DeployEvent::Completed { changed, unchanged } => serde_json::json!({
            "event": "complete",
            "status": "success",
            "changed": changed,
            "unchanged": unchanged,
        }),
    }
}

impl DeployEventSink for JsonEventSink {
    fn on_event(&self, event: DeployEvent) {
        self.write_event(event_json(&event));
    }
}

//! Console Event Sink
//!
//! Human-readable progress lines for a run, one per step transition.

use std::io::{self, Write};
use std::sync::Mutex;

use crate::domain::ports::{DeployEvent, DeployEventSink};

use super::theme::{self, colors, Icon};

pub struct ConsoleEventSink {
    writer: Mutex<Box<dyn Write + Send>>,
    color: bool,
    unicode: bool,
}

impl ConsoleEventSink {
    /// Progress goes to stderr so stdout stays clean for results
    pub fn stderr(color: bool, unicode: bool) -> Self {
        Self::with_writer(io::stderr(), color, unicode)
    }

    pub fn with_writer<W: Write + Send + 'static>(writer: W, color: bool, unicode: bool) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
            color,
            unicode,
        }
    }

    fn line(&self, event: &DeployEvent) -> Option<String> {
        let icon = |i: Icon| i.colored(self.color, self.unicode);
        match event {
            DeployEvent::Started {
                command,
                stack,
                resource_count,
            } => Some(format!(
                "{} {} {} {}",
                icon(Icon::Progress),
                command,
                stack,
                theme::paint(
                    &format!("({} resources)", resource_count),
                    colors::DIM,
                    self.color
                )
            )),
            DeployEvent::StepStarted { urn, op, .. } => Some(format!(
                "  {} {} {}...",
                icon(Icon::for_op(*op)),
                op,
                urn
            )),
            DeployEvent::StepCompleted { urn, op, .. } => {
                Some(format!("  {} {} {}", icon(Icon::Success), op, urn))
            }
            DeployEvent::StepFailed { urn, op, error, .. } => Some(format!(
                "  {} {} {}: {}",
                icon(Icon::Error),
                op,
                urn,
                theme::paint(error, colors::ERROR, self.color)
            )),
            DeployEvent::ConfigHashed { .. }
            | DeployEvent::Planned { .. }
            | DeployEvent::Output { .. }
            | DeployEvent::Completed { .. } => None,
        }
    }
}

impl DeployEventSink for ConsoleEventSink {
    fn on_event(&self, event: DeployEvent) {
        let Some(line) = self.line(&event) else {
            return;
        };
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

//! Command handlers for the `otelstack` binary

pub mod deploy;
pub mod hash;
pub mod outputs;

use std::sync::Arc;

use otelstack::domain::ports::DeployEventSink;
use otelstack::infrastructure::JsonEventSink;
use otelstack::presentation::{ConsoleEventSink, UiContext};

/// NDJSON on stdout for `--json`, progress lines on stderr otherwise
pub(crate) fn event_sink(ui: &UiContext) -> Arc<dyn DeployEventSink> {
    if ui.json {
        Arc::new(JsonEventSink::stdout())
    } else {
        Arc::new(ConsoleEventSink::stderr(ui.color, ui.unicode))
    }
}

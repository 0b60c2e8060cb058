use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::Result;

use otelstack::domain::ports::NoopEventSink;
use otelstack::presentation::output::outputs_json;
use otelstack::presentation::{create_deploy_use_case, TextRenderer, UiContext};
use otelstack::Config;

use crate::ui::json::emit;

pub fn cmd_outputs(config: &Config, ui: &UiContext) -> Result<()> {
    let use_case = create_deploy_use_case(
        config,
        Arc::new(NoopEventSink),
        Arc::new(AtomicBool::new(false)),
    );
    let outputs = use_case.outputs(config)?;

    if ui.json {
        emit(outputs_json(&outputs))?;
    } else {
        let renderer = TextRenderer {
            color: ui.color,
            unicode: ui.unicode,
            verbose: ui.verbose,
        };
        print!("{}", renderer.outputs(&outputs));
    }
    Ok(())
}

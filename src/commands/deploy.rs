use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{bail, Result};
use dialoguer::Confirm;
use tracing::debug;

use otelstack::presentation::output::{preview_json, result_json};
use otelstack::presentation::{create_deploy_use_case, TextRenderer, UiContext};
use otelstack::{Config, StackError};

use super::event_sink;
use crate::ui::json::emit;
use crate::ui::output::note;

fn renderer(ui: &UiContext) -> TextRenderer {
    TextRenderer {
        color: ui.color,
        unicode: ui.unicode,
        verbose: ui.verbose,
    }
}

pub fn cmd_preview(config: &Config, ui: &UiContext, diff: bool) -> Result<()> {
    let use_case = create_deploy_use_case(config, event_sink(ui), Arc::new(AtomicBool::new(false)));
    let preview = use_case.preview(config)?;

    if ui.json {
        emit(preview_json(&preview))?;
    } else {
        print!("{}", renderer(ui).preview(&preview, diff));
    }
    Ok(())
}

pub fn cmd_up(
    config: &Config,
    ui: &UiContext,
    yes: bool,
    diff: bool,
    interrupted: Arc<AtomicBool>,
) -> Result<()> {
    let use_case = create_deploy_use_case(config, event_sink(ui), interrupted);
    let run = use_case.prepare_up(config)?;

    if !ui.json {
        print!("{}", renderer(ui).plan(run.plan(), diff));
    }

    if run.plan().has_changes() && !yes && ui.can_prompt() {
        let confirmed = Confirm::new()
            .with_prompt("Apply these changes?")
            .default(false)
            .interact()?;
        if !confirmed {
            return Err(StackError::Aborted.into());
        }
    }

    let result = use_case.apply(run)?;
    debug!(changed = result.changed.len(), "up finished");

    if ui.json {
        emit(result_json(&result))?;
    } else {
        print!("{}", renderer(ui).result(&result));
    }
    Ok(())
}

pub fn cmd_destroy(
    config: &Config,
    ui: &UiContext,
    yes: bool,
    interrupted: Arc<AtomicBool>,
) -> Result<()> {
    let use_case = create_deploy_use_case(config, event_sink(ui), interrupted);
    let run = use_case.prepare_destroy(config)?;

    if !run.plan().has_changes() {
        note(ui, &format!("Nothing to destroy in stack '{}'", config.stack.name));
        if ui.json {
            emit(result_json(&use_case.apply(run)?))?;
        }
        return Ok(());
    }

    if !ui.json {
        print!("{}", renderer(ui).plan(run.plan(), false));
    }

    if !yes {
        if !ui.can_prompt() {
            bail!("destroy deletes {} resources; pass --yes to confirm when not running interactively", run.plan().change_count());
        }
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete all {} resources of stack '{}'?",
                run.plan().change_count(),
                config.stack.name
            ))
            .default(false)
            .interact()?;
        if !confirmed {
            return Err(StackError::Aborted.into());
        }
    }

    let result = use_case.apply(run)?;
    if ui.json {
        emit(result_json(&result))?;
    } else {
        print!("{}", renderer(ui).result(&result));
    }
    Ok(())
}

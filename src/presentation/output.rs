//! Output Rendering
//!
//! Text and JSON renderings of previews, run results and stack outputs.
//! Renderers return strings; the caller decides where they go.

use std::collections::BTreeMap;

use serde_json::{json, Value};
use similar::{ChangeTag, TextDiff};

use crate::application::{DeployResult, Preview};
use crate::domain::services::{Plan, PlannedStep, PropertyChange};
use crate::domain::value_objects::{Fingerprint, StepOp};

use super::theme::{self, colors, Icon};

const KNOWN_AFTER_APPLY: &str = "(known after apply)";

const SUMMARY_ORDER: [StepOp; 4] = [
    StepOp::Create,
    StepOp::Update,
    StepOp::Replace,
    StepOp::Delete,
];

/// Text renderer for plans and results
pub struct TextRenderer {
    /// Whether to use colors
    pub color: bool,
    /// Whether to use unicode
    pub unicode: bool,
    /// Verbosity level; unchanged resources are listed from 1 up
    pub verbose: u8,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            color: true,
            unicode: true,
            verbose: 0,
        }
    }
}

impl TextRenderer {
    /// One line per step, changed keys beneath, optional per-key diffs
    pub fn plan(&self, plan: &Plan, show_diff: bool) -> String {
        let mut out = String::new();
        for step in plan.steps() {
            if !step.is_change() && self.verbose == 0 {
                continue;
            }
            out.push_str(&self.step_line(step));
            out.push('\n');

            for change in &step.changes {
                out.push_str(&self.change_line(step.op, change));
                out.push('\n');
                if show_diff {
                    out.push_str(&render_property_diff(change, self.color));
                }
            }
        }
        out.push_str(&self.summary(plan));
        out.push('\n');
        out
    }

    pub fn preview(&self, preview: &Preview, show_diff: bool) -> String {
        let mut out = self.config_line(preview);
        out.push('\n');
        out.push_str(&self.plan(&preview.plan, show_diff));
        out
    }

    pub fn result(&self, result: &DeployResult) -> String {
        let mut out = String::new();
        for (urn, op) in &result.changed {
            out.push_str(&format!(
                "{} {} {}\n",
                Icon::Success.colored(self.color, self.unicode),
                op_label(*op),
                urn
            ));
        }

        let counts: Vec<String> = SUMMARY_ORDER
            .iter()
            .filter_map(|op| {
                let n = result.count(*op);
                (n > 0).then(|| format!("{} {}", n, past_tense(*op)))
            })
            .collect();
        let summary = if counts.is_empty() {
            format!("No changes, {} unchanged", result.unchanged.len())
        } else {
            format!("{}, {} unchanged", counts.join(", "), result.unchanged.len())
        };
        out.push_str(&format!(
            "\n{} {} {}\n",
            Icon::Success.colored(self.color, self.unicode),
            capitalize(result.kind.as_str()),
            summary
        ));

        if !result.outputs.is_empty() {
            out.push('\n');
            out.push_str(&self.outputs(&result.outputs));
        }
        out
    }

    pub fn outputs(&self, outputs: &BTreeMap<String, Fingerprint>) -> String {
        if outputs.is_empty() {
            return "No outputs\n".to_string();
        }
        let width = outputs.keys().map(String::len).max().unwrap_or(0);
        let mut out = String::from("Outputs:\n");
        for (name, value) in outputs {
            out.push_str(&format!(
                "  {:<width$}  {}\n",
                name,
                display_value(value),
                width = width
            ));
        }
        out
    }

    fn config_line(&self, preview: &Preview) -> String {
        let (icon, note) = if preview.config_changed {
            (Icon::Warning, "changed since last upload")
        } else {
            (Icon::Success, "unchanged")
        };
        format!(
            "{} Collector config {} {}",
            icon.colored(self.color, self.unicode),
            theme::paint(preview.digest.short(12), colors::INFO, self.color),
            theme::paint(note, colors::DIM, self.color)
        )
    }

    fn step_line(&self, step: &PlannedStep) -> String {
        let icon = Icon::for_op(step.op);
        let label = format!("{:<7}", op_label(step.op));
        format!(
            "{} {} {} {}",
            icon.colored(self.color, self.unicode),
            theme::paint(&label, icon.color(), self.color),
            step.urn,
            theme::paint(&format!("({})", step.name), colors::DIM, self.color)
        )
    }

    fn change_line(&self, op: StepOp, change: &PropertyChange) -> String {
        let marker = match (&change.old, &change.new) {
            (None, Some(_)) => Icon::Create,
            (Some(_), None) if !change.computed => Icon::Delete,
            _ => Icon::for_op(op),
        };
        let mut line = format!(
            "      {} {}",
            marker.colored(self.color, self.unicode),
            change.key
        );
        if change.computed {
            line.push(' ');
            line.push_str(&theme::paint(KNOWN_AFTER_APPLY, colors::DIM, self.color));
        }
        line
    }

    fn summary(&self, plan: &Plan) -> String {
        if !plan.has_changes() {
            return format!(
                "{} No changes. {} unchanged",
                Icon::Success.colored(self.color, self.unicode),
                plan.count(StepOp::Same)
            );
        }
        let counts: Vec<String> = SUMMARY_ORDER
            .iter()
            .filter_map(|op| {
                let n = plan.count(*op);
                (n > 0).then(|| format!("{} to {}", n, op_label(*op)))
            })
            .collect();
        format!(
            "Resources: {}, {} unchanged",
            counts.join(", "),
            plan.count(StepOp::Same)
        )
    }
}

/// Line diff of one property, old value against new, as pretty JSON
pub fn render_property_diff(change: &PropertyChange, supports_color: bool) -> String {
    let old = change.old.as_ref().map(pretty).unwrap_or_default();
    let new = if change.computed {
        format!("{}\n", KNOWN_AFTER_APPLY)
    } else {
        change.new.as_ref().map(pretty).unwrap_or_default()
    };

    let mut out = String::new();
    for line in TextDiff::from_lines(&old, &new).iter_all_changes() {
        let sign = match line.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        let text = format!("          {} {}", sign, line.value().trim_end_matches('\n'));
        let color = match line.tag() {
            ChangeTag::Delete => colors::ERROR,
            ChangeTag::Insert => colors::SUCCESS,
            ChangeTag::Equal => colors::DIM,
        };
        out.push_str(&theme::paint(&text, color, supports_color));
        out.push('\n');
    }
    out
}

pub fn plan_json(plan: &Plan) -> Value {
    let steps: Vec<Value> = plan
        .steps()
        .iter()
        .map(|step| {
            json!({
                "urn": step.urn.to_string(),
                "name": step.name,
                "op": step.op.as_str(),
                "changes": step.changes.iter().map(|c| json!({
                    "key": c.key,
                    "old": c.old,
                    "new": c.new,
                    "computed": c.computed,
                })).collect::<Vec<_>>(),
            })
        })
        .collect();
    let mut counts = serde_json::Map::new();
    for op in SUMMARY_ORDER.iter().copied().chain([StepOp::Same]) {
        counts.insert(op.as_str().to_string(), json!(plan.count(op)));
    }
    json!({ "steps": steps, "counts": counts })
}

pub fn preview_json(preview: &Preview) -> Value {
    json!({
        "event": "preview",
        "config_hash": preview.digest.as_str(),
        "config_changed": preview.config_changed,
        "plan": plan_json(&preview.plan),
    })
}

pub fn result_json(result: &DeployResult) -> Value {
    json!({
        "event": "result",
        "command": result.kind.as_str(),
        "config_hash": result.digest.as_ref().map(|d| d.as_str()),
        "changed": result.changed.iter().map(|(urn, op)| json!({
            "urn": urn.to_string(),
            "op": op.as_str(),
        })).collect::<Vec<_>>(),
        "unchanged": result.unchanged.iter().map(|u| u.to_string()).collect::<Vec<_>>(),
        "outputs": result.outputs,
    })
}

pub fn outputs_json(outputs: &BTreeMap<String, Fingerprint>) -> Value {
    json!({ "event": "outputs", "outputs": outputs })
}

fn pretty(value: &Value) -> String {
    let mut s = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    s.push('\n');
    s
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) if map.contains_key("secret") => "[secret]".to_string(),
        other => other.to_string(),
    }
}

fn op_label(op: StepOp) -> &'static str {
    op.as_str()
}

fn past_tense(op: StepOp) -> &'static str {
    match op {
        StepOp::Create => "created",
        StepOp::Update => "updated",
        StepOp::Replace => "replaced",
        StepOp::Delete => "deleted",
        StepOp::Same => "unchanged",
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

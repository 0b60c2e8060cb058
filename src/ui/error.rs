use std::path::Path;

use otelstack::presentation::terminal::detect_capabilities;
use otelstack::presentation::theme::{self, colors, Icon};
use otelstack::StackError;

pub fn format_error(err: &anyhow::Error, supports_color: bool, supports_unicode: bool) -> String {
    let icon = Icon::Error.colored(supports_color, supports_unicode);
    let mut out = format!(
        "{} {}\n",
        icon,
        theme::paint(&err.to_string(), colors::ERROR, supports_color)
    );
    for cause in err.chain().skip(1) {
        out.push_str(&format!("  caused by: {}\n", cause));
    }
    if let Some(hint) = err.downcast_ref::<StackError>().and_then(hint) {
        out.push_str(&format!("  {}\n", theme::paint(hint, colors::DIM, supports_color)));
    }
    out
}

fn hint(err: &StackError) -> Option<&'static str> {
    match err {
        StackError::StepFailed { .. } | StackError::ReadFailed { .. } => {
            Some("state was saved up to the failing step; fix the cause and run `otelstack up` again")
        }
        StackError::Interrupted => Some("run `otelstack up` again to continue"),
        StackError::StateLocked { .. } => {
            Some("another otelstack run is in progress for this stack")
        }
        _ => None,
    }
}

fn error_file(err: &anyhow::Error) -> Option<&Path> {
    match err.downcast_ref::<StackError>()? {
        StackError::ConfigFileUnreadable { path, .. } => Some(path.as_path()),
        StackError::InvalidConfig { file, .. } => Some(file.as_path()),
        StackError::State { path, .. } => Some(path.as_path()),
        _ => None,
    }
}

/// `::error file=...::message` line for GitHub Actions logs
pub fn github_actions_annotation(message: &str, file: Option<&Path>) -> String {
    let message = message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A");
    match file {
        Some(file) => format!("::error file={},title=otelstack::{}", file.display(), message),
        None => format!("::error title=otelstack::{}", message),
    }
}

pub fn print_error(err: &anyhow::Error, json: bool) {
    if json {
        let output = serde_json::json!({
            "event": "error",
            "message": err.to_string(),
        });
        let _ = crate::ui::json::emit(output);
        return;
    }

    let caps = detect_capabilities();
    if caps.is_ci && std::env::var("GITHUB_ACTIONS").is_ok() {
        println!(
            "{}",
            github_actions_annotation(&err.to_string(), error_file(err))
        );
    }

    eprint!(
        "{}",
        format_error(err, caps.supports_color, caps.supports_unicode)
    );
}

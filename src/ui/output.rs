use std::path::Path;

use otelstack::config::ConfigWarning;
use otelstack::presentation::theme::{self, colors, Icon};
use otelstack::presentation::UiContext;

pub fn print_config_warnings(path: &Path, warnings: &[ConfigWarning], ui: &UiContext) {
    if ui.json {
        return;
    }
    let icon = Icon::Warning.colored(ui.color, ui.unicode);
    for w in warnings {
        match w.line {
            Some(line) => eprintln!(
                "{} Unknown config key '{}' in {}:{}",
                icon,
                w.key,
                path.display(),
                line
            ),
            None => eprintln!(
                "{} Unknown config key '{}' in {}",
                icon,
                w.key,
                path.display()
            ),
        }

        if let Some(suggestion) = &w.suggestion {
            eprintln!("   Did you mean '{}'?\n", suggestion);
        }
    }
}

/// Progress-free one-liner on stderr, e.g. before a prompt
pub fn note(ui: &UiContext, message: &str) {
    if ui.json {
        return;
    }
    eprintln!(
        "{} {}",
        Icon::Progress.colored(ui.color, ui.unicode),
        theme::paint(message, colors::INFO, ui.color)
    );
}

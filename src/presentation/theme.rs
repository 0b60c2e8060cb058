use crossterm::style::{Color, Stylize};

use crate::domain::value_objects::StepOp;

/// Design tokens for otelstack output.
///
/// Design constraints:
/// - Only 5 semantic colors (`colors::*`)
/// - All icons are sourced from this module
pub mod colors {
    use super::Color;

    /// #22C55E
    pub const SUCCESS: Color = Color::Green;
    /// #EF4444
    pub const ERROR: Color = Color::Red;
    /// #F59E0B
    pub const WARNING: Color = Color::Yellow;
    /// #06B6D4
    pub const INFO: Color = Color::Cyan;
    /// #6B7280
    pub const DIM: Color = Color::DarkGrey;
}

pub mod icons {
    pub const SUCCESS: &str = "✓";
    pub const ERROR: &str = "✗";
    pub const WARNING: &str = "⚠";
    pub const PROGRESS: &str = "●";
    pub const CREATE: &str = "+";
    pub const UPDATE: &str = "~";
    pub const REPLACE: &str = "±";
    pub const DELETE: &str = "-";
    pub const SAME: &str = "○";
}

pub mod icons_ascii {
    pub const SUCCESS: &str = "[OK]";
    pub const ERROR: &str = "[FAIL]";
    pub const WARNING: &str = "[WARN]";
    pub const PROGRESS: &str = "[..]";
    pub const CREATE: &str = "+";
    pub const UPDATE: &str = "~";
    pub const REPLACE: &str = "+-";
    pub const DELETE: &str = "-";
    pub const SAME: &str = " ";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Success,
    Error,
    Warning,
    Progress,
    Create,
    Update,
    Replace,
    Delete,
    Same,
}

impl Icon {
    pub fn for_op(op: StepOp) -> Self {
        match op {
            StepOp::Create => Icon::Create,
            StepOp::Update => Icon::Update,
            StepOp::Replace => Icon::Replace,
            StepOp::Delete => Icon::Delete,
            StepOp::Same => Icon::Same,
        }
    }

    pub fn render(&self, supports_unicode: bool) -> &'static str {
        match (supports_unicode, self) {
            (true, Icon::Success) => icons::SUCCESS,
            (true, Icon::Error) => icons::ERROR,
            (true, Icon::Warning) => icons::WARNING,
            (true, Icon::Progress) => icons::PROGRESS,
            (true, Icon::Create) => icons::CREATE,
            (true, Icon::Update) => icons::UPDATE,
            (true, Icon::Replace) => icons::REPLACE,
            (true, Icon::Delete) => icons::DELETE,
            (true, Icon::Same) => icons::SAME,
            (false, Icon::Success) => icons_ascii::SUCCESS,
            (false, Icon::Error) => icons_ascii::ERROR,
            (false, Icon::Warning) => icons_ascii::WARNING,
            (false, Icon::Progress) => icons_ascii::PROGRESS,
            (false, Icon::Create) => icons_ascii::CREATE,
            (false, Icon::Update) => icons_ascii::UPDATE,
            (false, Icon::Replace) => icons_ascii::REPLACE,
            (false, Icon::Delete) => icons_ascii::DELETE,
            (false, Icon::Same) => icons_ascii::SAME,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Icon::Success | Icon::Create => colors::SUCCESS,
            Icon::Error | Icon::Delete => colors::ERROR,
            Icon::Warning | Icon::Progress | Icon::Update | Icon::Replace => colors::WARNING,
            Icon::Same => colors::DIM,
        }
    }

    pub fn colored(&self, supports_color: bool, supports_unicode: bool) -> String {
        let s = self.render(supports_unicode);
        if !supports_color {
            return s.to_string();
        }
        format!("{}", s.with(self.color()))
    }
}

/// `text` in `color`, or plain when color is off
pub fn paint(text: &str, color: Color, enabled: bool) -> String {
    if enabled {
        format!("{}", text.with(color))
    } else {
        text.to_string()
    }
}

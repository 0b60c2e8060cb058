//! Presentation Layer
//!
//! This layer handles:
//! - Creating use cases with infrastructure dependencies
//! - Output formatting (text/JSON)
//! - Progress reporting during a run
//!
//! ## Structure
//!
//! - `cli` - Argument parsing (clap)
//! - `context` - Per-invocation UI settings (color, unicode, prompts)
//! - `factory` - Creates use cases with proper dependencies (dependency injection)
//! - `output` - Plan, result and output rendering
//! - `progress` - Console event sink
//! - `terminal` - Terminal capability detection
//! - `theme` - Colors and icons

pub mod cli;
pub mod context;
pub mod factory;
pub mod output;
pub mod progress;
pub mod terminal;
pub mod theme;

pub use cli::{Cli, ColorWhen, Commands};
pub use context::UiContext;

pub use factory::{create_deploy_use_case, ConcreteDeployUseCase};
pub use output::TextRenderer;
pub use progress::ConsoleEventSink;

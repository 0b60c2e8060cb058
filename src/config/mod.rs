//! Configuration module for otelstack
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (OTELSTACK_*, and secrets by their own name)
//! 3. Stack config (`otelstack.toml`)
//! 4. Built-in defaults (lowest priority)

mod loader;
mod types;

pub use loader::ConfigWarning;
pub use types::{
    AccessMode, AzConfig, CollectorConfig, ColorMode, Config, OutputConfig, StackConfig,
    StorageConfig, HONEYCOMB_API_KEY,
};

//! Terminal-side helpers for the `otelstack` binary

pub mod error;
pub mod json;
pub mod output;

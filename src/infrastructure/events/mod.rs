//! Event Sink Implementations
//!
//! - JsonEventSink: NDJSON output for CI/automation
//!
//! The human-readable sink lives in `presentation::progress`.

mod json;

pub use json::{event_json, JsonEventSink};

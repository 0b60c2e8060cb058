//! Common test utilities for otelstack integration and CLI tests.
//!
//! This module provides:
//! - `TestEnv`: Isolated project directory plus helpers to run the CLI
//! - `FAKE_AZ`: A stand-in `az` that logs its arguments and answers with
//!   canned JSON (unix only)
//! - Fixtures: stack config and collector config content

#![allow(dead_code)]

pub mod env;
pub mod fixtures;

pub use env::*;
pub use fixtures::*;

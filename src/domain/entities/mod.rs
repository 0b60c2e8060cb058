//! Domain Entities
//!
//! - `Resource` - A declared resource (desired state)
//! - `ResolvedResource` - A declaration with every output reference substituted
//! - `StateSnapshot` - Last-applied state of a stack

mod resource;
mod state;

pub use resource::{MissingInput, Outputs, ResolvedResource, Resource};
pub use state::{ResourceState, StateSnapshot};

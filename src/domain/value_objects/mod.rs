//! Value Objects
//!
//! Immutable types defined by their values.

mod hash;
mod property;
mod secret;
mod step_op;
mod urn;

pub use hash::ContentHash;
pub use property::{Fingerprint, OutputRef, PropertyValue};
pub use secret::Secret;
pub use step_op::StepOp;
pub use urn::{ResourceKind, Urn};

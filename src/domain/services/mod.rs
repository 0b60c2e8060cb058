//! Domain Services
//!
//! Pure business logic services that operate on domain entities.
//! These services have no I/O dependencies and are easily testable.

mod config_binding;
mod graph;
mod naming;
mod planner;
mod stack;

pub use config_binding::{ConfigBinding, CONFIG_FILE_HASH};
pub use graph::ResourceGraph;
pub use naming::{
    auto_name, validate_container_app_name, validate_stack_name, validate_storage_account_name,
};
pub use planner::{Plan, PlannedStep, Planner, PropertyChange, NAME_KEY};
pub use stack::{CollectorStack, COLLECTOR_URL, HONEYCOMB_SECRET_NAME};

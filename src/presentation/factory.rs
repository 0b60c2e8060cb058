//! Use Case Factory
//!
//! Creates use cases with infrastructure dependencies wired up.
//! This is the dependency injection point for the application.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::application::DeployUseCase;
use crate::config::Config;
use crate::domain::ports::DeployEventSink;
use crate::infrastructure::{AzCli, AzCliProvider, AzFileUploader, JsonStateRepository};

/// Type alias for the concrete DeployUseCase with all dependencies
pub type ConcreteDeployUseCase = DeployUseCase<AzCliProvider, AzFileUploader, JsonStateRepository>;

/// Create a deploy use case that talks to Azure through the `az` program
/// named in `config`
pub fn create_deploy_use_case(
    config: &Config,
    events: Arc<dyn DeployEventSink>,
    interrupted: Arc<AtomicBool>,
) -> ConcreteDeployUseCase {
    let az = AzCli::new(config.az.program.clone());
    DeployUseCase::new(
        AzCliProvider::new(az.clone()),
        AzFileUploader::new(az),
        JsonStateRepository::new(),
    )
    .with_events(events)
    .with_interrupt_flag(interrupted)
}

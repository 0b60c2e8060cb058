//! Domain Layer
//!
//! The declarative engine behind otelstack: resource declarations, the
//! dependency graph, the diff planner and the state snapshot.
//!
//! ## Structure
//!
//! - `entities/` - Core domain entities (Resource, ResolvedResource, StateSnapshot)
//! - `value_objects/` - Immutable value types (ContentHash, Secret, Urn, PropertyValue)
//! - `services/` - Domain services (ResourceGraph, Planner, CollectorStack)
//! - `ports/` - Interface definitions for infrastructure
//!
//! ## Design Principles
//!
//! 1. **No I/O** - This layer never calls the cloud, runs commands or touches state files
//! 2. **Pure Functions** - Services are stateless and testable
//! 3. **Ports & Adapters** - All I/O goes through trait-defined ports

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;

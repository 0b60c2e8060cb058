//! State snapshot entity - what was last applied
//!
//! The snapshot is the only memory the tool has between runs. It stores
//! fingerprints, never plaintext secrets, and is keyed by urn. I/O is handled
//! by a `StateRepository`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::resource::{Outputs, ResolvedResource};
use crate::domain::value_objects::{Fingerprint, Urn};

/// Last-applied record of one resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    pub urn: Urn,
    /// Physical name at the provider
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub inputs: BTreeMap<String, Fingerprint>,
    #[serde(default)]
    pub outputs: BTreeMap<String, Fingerprint>,
    #[serde(default)]
    pub dependencies: Vec<Urn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_with: Option<Urn>,
    pub updated_at: DateTime<Utc>,
}

impl ResourceState {
    /// Record a successful create/update
    pub fn applied(
        resource: &ResolvedResource,
        outputs: &Outputs,
        dependencies: Vec<Urn>,
        deleted_with: Option<Urn>,
    ) -> Self {
        let id = outputs
            .get("id")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        Self {
            urn: resource.urn().clone(),
            name: resource.name().to_string(),
            id,
            inputs: resource.fingerprints(),
            outputs: outputs
                .iter()
                .filter_map(|(k, v)| v.fingerprint().map(|fp| (k.clone(), fp)))
                .collect(),
            dependencies,
            deleted_with,
            updated_at: Utc::now(),
        }
    }

    /// A recorded input that was stored as a plain string
    pub fn input_str(&self, key: &str) -> Option<&str> {
        self.inputs.get(key).and_then(|v| v.as_str())
    }

    pub fn output_str(&self, key: &str) -> Option<&str> {
        self.outputs.get(key).and_then(|v| v.as_str())
    }
}

/// The state snapshot of one stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    version: u32,
    stack: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    resources: BTreeMap<Urn, ResourceState>,
    #[serde(default)]
    outputs: BTreeMap<String, Fingerprint>,
}

impl StateSnapshot {
    pub const VERSION: u32 = 1;

    pub fn new(stack: impl Into<String>) -> Self {
        Self {
            version: Self::VERSION,
            stack: stack.into(),
            updated_at: None,
            resources: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn stack(&self) -> &str {
        &self.stack
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn get(&self, urn: &Urn) -> Option<&ResourceState> {
        self.resources.get(urn)
    }

    pub fn contains(&self, urn: &Urn) -> bool {
        self.resources.contains_key(urn)
    }

    pub fn upsert(&mut self, state: ResourceState) {
        self.updated_at = Some(state.updated_at);
        self.resources.insert(state.urn.clone(), state);
    }

    pub fn remove(&mut self, urn: &Urn) -> Option<ResourceState> {
        let removed = self.resources.remove(urn);
        if removed.is_some() {
            self.updated_at = Some(Utc::now());
        }
        removed
    }

    pub fn resources(&self) -> impl Iterator<Item = &ResourceState> {
        self.resources.values()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn output(&self, name: &str) -> Option<&Fingerprint> {
        self.outputs.get(name)
    }

    pub fn outputs(&self) -> &BTreeMap<String, Fingerprint> {
        &self.outputs
    }

    pub fn set_output(&mut self, name: impl Into<String>, value: Fingerprint) {
        self.outputs.insert(name.into(), value);
    }

    pub fn clear_outputs(&mut self) {
        self.outputs.clear();
    }
}

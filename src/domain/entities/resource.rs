//! Resource entity - one declared piece of infrastructure
//!
//! A `Resource` is what the stack declares: desired inputs, which may still
//! reference other resources' outputs. A `ResolvedResource` is the same
//! declaration with every reference substituted, ready for a provider call.

use std::collections::BTreeMap;

use crate::domain::value_objects::{Fingerprint, PropertyValue, ResourceKind, Secret, Urn};

/// Values a provider reports back after apply or read (may contain secrets)
pub type Outputs = BTreeMap<String, PropertyValue>;

#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    urn: Urn,
    name: String,
    inputs: BTreeMap<String, PropertyValue>,
    depends_on: Vec<Urn>,
    deleted_with: Option<Urn>,
}

impl Resource {
    pub fn new(kind: ResourceKind, logical: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            urn: Urn::new(kind, logical),
            name: name.into(),
            inputs: BTreeMap::new(),
            depends_on: Vec::new(),
            deleted_with: None,
        }
    }

    pub fn input(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.inputs.insert(key.into(), value.into());
        self
    }

    /// Explicit ordering edge, for dependencies that carry no data
    pub fn depends_on(mut self, urn: &Urn) -> Self {
        if !self.depends_on.contains(urn) {
            self.depends_on.push(urn.clone());
        }
        self
    }

    /// Removing `urn` also removes this resource's remote effect
    pub fn deleted_with(mut self, urn: &Urn) -> Self {
        self.deleted_with = Some(urn.clone());
        self
    }

    pub fn urn(&self) -> &Urn {
        &self.urn
    }

    pub fn kind(&self) -> ResourceKind {
        self.urn.kind()
    }

    /// Physical name at the provider
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &BTreeMap<String, PropertyValue> {
        &self.inputs
    }

    pub fn explicit_dependencies(&self) -> &[Urn] {
        &self.depends_on
    }

    pub fn deleted_with_target(&self) -> Option<&Urn> {
        self.deleted_with.as_ref()
    }

    /// Explicit `depends_on` edges followed by every referenced urn, deduplicated
    pub fn dependencies(&self) -> Vec<Urn> {
        let mut deps: Vec<Urn> = self.depends_on.clone();
        for value in self.inputs.values() {
            for r in value.references() {
                if !deps.contains(&r.urn) {
                    deps.push(r.urn.clone());
                }
            }
        }
        deps
    }
}

/// Missing or mistyped input on a resolved resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingInput {
    pub urn: Urn,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedResource {
    urn: Urn,
    name: String,
    inputs: BTreeMap<String, PropertyValue>,
}

impl ResolvedResource {
    pub fn new(urn: Urn, name: impl Into<String>, inputs: BTreeMap<String, PropertyValue>) -> Self {
        Self {
            urn,
            name: name.into(),
            inputs,
        }
    }

    pub fn urn(&self) -> &Urn {
        &self.urn
    }

    pub fn kind(&self) -> ResourceKind {
        self.urn.kind()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inputs(&self) -> &BTreeMap<String, PropertyValue> {
        &self.inputs
    }

    pub fn get(&self, key: &str) -> Result<&PropertyValue, MissingInput> {
        self.inputs.get(key).ok_or_else(|| self.missing(key))
    }

    pub fn str(&self, key: &str) -> Result<&str, MissingInput> {
        self.get(key)?.as_str().ok_or_else(|| self.missing(key))
    }

    pub fn int(&self, key: &str) -> Result<i64, MissingInput> {
        self.get(key)?.as_int().ok_or_else(|| self.missing(key))
    }

    pub fn secret(&self, key: &str) -> Result<&Secret, MissingInput> {
        self.get(key)?.as_secret().ok_or_else(|| self.missing(key))
    }

    /// Fingerprints of all inputs, as persisted in state
    pub fn fingerprints(&self) -> BTreeMap<String, Fingerprint> {
        self.inputs
            .iter()
            .filter_map(|(k, v)| v.fingerprint().map(|fp| (k.clone(), fp)))
            .collect()
    }

    fn missing(&self, key: &str) -> MissingInput {
        MissingInput {
            urn: self.urn.clone(),
            key: key.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn share() -> Urn {
        Urn::new(ResourceKind::FileShare, "fileShare")
    }

    #[test]
    fn dependencies_merge_explicit_and_referenced() {
        let app = Urn::new(ResourceKind::UploadCommand, "config-file-upload");
        let resource = Resource::new(ResourceKind::ContainerApp, "collector", "collector")
            .depends_on(&app)
            .depends_on(&app)
            .input("share", PropertyValue::output(&share(), "name"))
            .input("again", PropertyValue::output(&share(), "id"));

        assert_eq!(resource.dependencies(), vec![app, share()]);
    }

    #[test]
    fn deleted_with_is_recorded() {
        let resource = Resource::new(ResourceKind::UploadCommand, "upload", "upload")
            .deleted_with(&share());
        assert_eq!(resource.deleted_with_target(), Some(&share()));
    }

    #[test]
    fn resolved_accessors_report_missing_keys() {
        let mut inputs = BTreeMap::new();
        inputs.insert("location".to_string(), PropertyValue::from("eastus"));
        inputs.insert("port".to_string(), PropertyValue::from(4318u16));
        let resolved = ResolvedResource::new(
            Urn::new(ResourceKind::ResourceGroup, "resourceGroup"),
            "rg",
            inputs,
        );

        assert_eq!(resolved.str("location").unwrap(), "eastus");
        assert_eq!(resolved.int("port").unwrap(), 4318);
        assert_eq!(resolved.str("port").unwrap_err().key, "port");
        assert_eq!(resolved.secret("location").unwrap_err().key, "location");
        assert_eq!(resolved.get("nope").unwrap_err().key, "nope");
    }

    #[test]
    fn fingerprints_hide_secrets() {
        let mut inputs = BTreeMap::new();
        inputs.insert("key".to_string(), PropertyValue::from(Secret::new("plain")));
        let resolved = ResolvedResource::new(share(), "config", inputs);
        let json = serde_json::to_string(&resolved.fingerprints()).unwrap();
        assert!(!json.contains("plain"));
    }
}

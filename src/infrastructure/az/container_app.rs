//! Container app YAML
//!
//! `az containerapp create/update --yaml` takes the ARM resource shape. The
//! document is rendered from resolved inputs with secrets in the clear, so it
//! only ever lives in a private temp file for the duration of the call.

use std::io::Write;

use serde_json::{json, Value};
use tempfile::NamedTempFile;

use crate::domain::entities::ResolvedResource;
use crate::domain::ports::{ProviderError, ProviderResult};

fn exposed(resource: &ResolvedResource, key: &str) -> ProviderResult<Value> {
    resource
        .get(key)?
        .to_exposed_json()
        .ok_or_else(|| ProviderError::InvalidResponse {
            urn: resource.urn().clone(),
            message: format!("input '{}' still holds an unresolved output", key),
        })
}

/// The YAML document for `resource`
pub fn render(resource: &ResolvedResource) -> ProviderResult<String> {
    let document = json!({
        "name": resource.name(),
        "properties": {
            "managedEnvironmentId": resource.str("environmentId")?,
            "configuration": exposed(resource, "configuration")?,
            "template": exposed(resource, "template")?,
        },
    });
    serde_yaml_ng::to_string(&document).map_err(|e| ProviderError::InvalidResponse {
        urn: resource.urn().clone(),
        message: e.to_string(),
    })
}

/// Render into a temp file that is removed when dropped
pub fn write_temp(resource: &ResolvedResource) -> ProviderResult<NamedTempFile> {
    let yaml = render(resource)?;
    let mut file = tempfile::Builder::new()
        .prefix("otelstack-app-")
        .suffix(".yaml")
        .tempfile()?;
    file.write_all(yaml.as_bytes())?;
    file.flush()?;
    Ok(file)
}

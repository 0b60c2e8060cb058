//! `az`-backed control plane
//!
//! Maps each resource kind onto its `az` command group. Create and update
//! return the same output set for a kind; `read` recomputes it with `show`
//! so unchanged resources can feed references without being touched.

use serde_json::Value;
use tracing::debug;

use crate::domain::entities::{Outputs, ResolvedResource, ResourceState};
use crate::domain::ports::{CloudProvider, ProviderError, ProviderResult};
use crate::domain::value_objects::{PropertyValue, ResourceKind, Secret, StepOp, Urn};

use super::container_app;
use super::{not_found_or, str_at, AzCli, AzCommand};

/// Storage account key handed to dependents
const PRIMARY_KEY_NAME: &str = "key1";

pub struct AzCliProvider {
    az: AzCli,
}

impl AzCliProvider {
    pub fn new(az: AzCli) -> Self {
        Self { az }
    }

    fn write(&self, op: StepOp, resource: &ResolvedResource) -> ProviderResult<Outputs> {
        let urn = resource.urn();
        let name = resource.name();
        debug!(%urn, %op, name, "applying");

        let body = match resource.kind() {
            ResourceKind::ResourceGroup => self.az.run_json(
                &AzCommand::new(["group", "create"])
                    .opt("--name", name)
                    .opt("--location", resource.str("location")?),
                urn,
            )?,
            ResourceKind::StorageAccount => {
                let cmd = match op {
                    StepOp::Update => AzCommand::new(["storage", "account", "update"]),
                    _ => AzCommand::new(["storage", "account", "create"])
                        .opt("--location", resource.str("location")?)
                        .opt("--kind", resource.str("kind")?),
                };
                self.az.run_json(
                    &cmd.opt("--name", name)
                        .opt("--resource-group", resource.str("resourceGroupName")?)
                        .opt("--sku", resource.str("sku")?),
                    urn,
                )?
            }
            ResourceKind::FileShare => {
                let cmd = match op {
                    StepOp::Update => AzCommand::new(["storage", "share-rm", "update"]),
                    _ => AzCommand::new(["storage", "share-rm", "create"])
                        .opt("--enabled-protocols", resource.str("enabledProtocols")?),
                };
                self.az.run_json(
                    &cmd.opt("--name", name)
                        .opt("--resource-group", resource.str("resourceGroupName")?)
                        .opt("--storage-account", resource.str("accountName")?)
                        .opt("--quota", resource.int("shareQuota")?.to_string()),
                    urn,
                )?
            }
            ResourceKind::ManagedEnvironment => {
                let cmd = match op {
                    StepOp::Update => AzCommand::new(["containerapp", "env", "update"]),
                    _ => AzCommand::new(["containerapp", "env", "create"])
                        .opt("--location", resource.str("location")?),
                };
                self.az.run_json(
                    &cmd.opt("--name", name)
                        .opt("--resource-group", resource.str("resourceGroupName")?)
                        .opt("--logs-destination", logs_destination(resource)?),
                    urn,
                )?
            }
            ResourceKind::EnvironmentStorage => {
                let account_key = nested(resource, "azureFile", "accountKey")?
                    .as_secret()
                    .ok_or_else(|| missing(urn, "azureFile.accountKey"))?;
                self.az.run_json(
                    &AzCommand::new(["containerapp", "env", "storage", "set"])
                        .opt("--name", resource.str("environmentName")?)
                        .opt("--resource-group", resource.str("resourceGroupName")?)
                        .opt("--storage-name", name)
                        .opt("--access-mode", nested_str(resource, "azureFile", "accessMode")?)
                        .opt("--azure-file-share-name", nested_str(resource, "azureFile", "shareName")?)
                        .opt(
                            "--azure-file-account-name",
                            nested_str(resource, "azureFile", "accountName")?,
                        )
                        .secret_opt("--azure-file-account-key", account_key),
                    urn,
                )?
            }
            ResourceKind::ContainerApp => {
                let yaml = container_app::write_temp(resource)?;
                let cmd = match op {
                    StepOp::Update => AzCommand::new(["containerapp", "update"]),
                    _ => AzCommand::new(["containerapp", "create"])
                        .opt("--environment", resource.str("environmentId")?),
                };
                self.az.run_json(
                    &cmd.opt("--name", name)
                        .opt("--resource-group", resource.str("resourceGroupName")?)
                        .path_opt("--yaml", yaml.path()),
                    urn,
                )?
            }
            ResourceKind::UploadCommand => return Err(not_a_provider_resource(urn)),
        };

        self.outputs(urn, name, &body, resource.str("resourceGroupName").ok())
    }

    /// Outputs of a kind from its `create`/`update`/`show` response
    fn outputs(
        &self,
        urn: &Urn,
        name: &str,
        body: &Value,
        resource_group: Option<&str>,
    ) -> ProviderResult<Outputs> {
        let mut outputs = Outputs::new();
        outputs.insert("name".to_string(), name.into());
        outputs.insert("id".to_string(), str_at(body, "/id", urn)?.into());

        match urn.kind() {
            ResourceKind::StorageAccount => {
                let resource_group =
                    resource_group.ok_or_else(|| missing(urn, "resourceGroupName"))?;
                let key = self.account_key(urn, name, resource_group)?;
                outputs.insert("primaryKey".to_string(), key.into());
            }
            ResourceKind::ManagedEnvironment => {
                outputs.insert(
                    "defaultDomain".to_string(),
                    str_at(body, "/properties/defaultDomain", urn)?.into(),
                );
            }
            ResourceKind::ContainerApp => {
                let fqdn = str_at(body, "/properties/configuration/ingress/fqdn", urn)?;
                outputs.insert("url".to_string(), format!("https://{}", fqdn).into());
                outputs.insert("fqdn".to_string(), fqdn.into());
                if let Ok(revision) = str_at(body, "/properties/latestRevisionName", urn) {
                    outputs.insert("latestRevisionName".to_string(), revision.into());
                }
            }
            _ => {}
        }
        Ok(outputs)
    }

    fn account_key(&self, urn: &Urn, account: &str, resource_group: &str) -> ProviderResult<Secret> {
        let keys = self.az.run_json(
            &AzCommand::new(["storage", "account", "keys", "list"])
                .opt("--account-name", account)
                .opt("--resource-group", resource_group),
            urn,
        )?;
        let keys = keys.as_array().map(Vec::as_slice).unwrap_or_default();
        keys.iter()
            .find(|k| k["keyName"] == PRIMARY_KEY_NAME)
            .or_else(|| keys.first())
            .and_then(|k| k["value"].as_str())
            .map(Secret::new)
            .ok_or_else(|| ProviderError::InvalidResponse {
                urn: urn.clone(),
                message: "no storage account keys returned".to_string(),
            })
    }
}

impl CloudProvider for AzCliProvider {
    fn create(&self, resource: &ResolvedResource) -> ProviderResult<Outputs> {
        self.write(StepOp::Create, resource)
    }

    fn update(
        &self,
        resource: &ResolvedResource,
        _prior: &ResourceState,
    ) -> ProviderResult<Outputs> {
        self.write(StepOp::Update, resource)
    }

    fn delete(&self, prior: &ResourceState) -> ProviderResult<()> {
        let urn = &prior.urn;
        let name = prior.name.as_str();
        debug!(%urn, name, "deleting");

        let cmd = match urn.kind() {
            ResourceKind::ResourceGroup => {
                AzCommand::new(["group", "delete"]).opt("--name", name)
            }
            ResourceKind::StorageAccount => AzCommand::new(["storage", "account", "delete"])
                .opt("--name", name)
                .opt("--resource-group", recorded(prior, "resourceGroupName")?),
            ResourceKind::FileShare => AzCommand::new(["storage", "share-rm", "delete"])
                .opt("--name", name)
                .opt("--resource-group", recorded(prior, "resourceGroupName")?)
                .opt("--storage-account", recorded(prior, "accountName")?),
            ResourceKind::ManagedEnvironment => AzCommand::new(["containerapp", "env", "delete"])
                .opt("--name", name)
                .opt("--resource-group", recorded(prior, "resourceGroupName")?),
            ResourceKind::EnvironmentStorage => {
                AzCommand::new(["containerapp", "env", "storage", "remove"])
                    .opt("--name", recorded(prior, "environmentName")?)
                    .opt("--resource-group", recorded(prior, "resourceGroupName")?)
                    .opt("--storage-name", name)
            }
            ResourceKind::ContainerApp => AzCommand::new(["containerapp", "delete"])
                .opt("--name", name)
                .opt("--resource-group", recorded(prior, "resourceGroupName")?),
            ResourceKind::UploadCommand => return Err(not_a_provider_resource(urn)),
        };

        self.az
            .run(&cmd.arg("--yes"))
            .map(|_| ())
            .map_err(|e| not_found_or(e, urn))
    }

    fn read(&self, prior: &ResourceState) -> ProviderResult<Outputs> {
        let urn = &prior.urn;
        let name = prior.name.as_str();
        let resource_group = prior.input_str("resourceGroupName");

        let cmd = match urn.kind() {
            ResourceKind::ResourceGroup => AzCommand::new(["group", "show"]).opt("--name", name),
            ResourceKind::StorageAccount => AzCommand::new(["storage", "account", "show"])
                .opt("--name", name)
                .opt("--resource-group", recorded(prior, "resourceGroupName")?),
            ResourceKind::FileShare => AzCommand::new(["storage", "share-rm", "show"])
                .opt("--name", name)
                .opt("--resource-group", recorded(prior, "resourceGroupName")?)
                .opt("--storage-account", recorded(prior, "accountName")?),
            ResourceKind::ManagedEnvironment => AzCommand::new(["containerapp", "env", "show"])
                .opt("--name", name)
                .opt("--resource-group", recorded(prior, "resourceGroupName")?),
            ResourceKind::EnvironmentStorage => {
                AzCommand::new(["containerapp", "env", "storage", "show"])
                    .opt("--name", recorded(prior, "environmentName")?)
                    .opt("--resource-group", recorded(prior, "resourceGroupName")?)
                    .opt("--storage-name", name)
            }
            ResourceKind::ContainerApp => AzCommand::new(["containerapp", "show"])
                .opt("--name", name)
                .opt("--resource-group", recorded(prior, "resourceGroupName")?),
            ResourceKind::UploadCommand => return Err(not_a_provider_resource(urn)),
        };

        let body = self.az.show(&cmd, urn)?;
        if body.is_null() {
            return Err(ProviderError::NotFound { urn: urn.clone() });
        }
        self.outputs(urn, name, &body, resource_group)
    }
}

/// `az containerapp env` wants `none` for an empty log destination
fn logs_destination(resource: &ResolvedResource) -> ProviderResult<&str> {
    let destination = nested_str(resource, "appLogsConfiguration", "destination")?;
    Ok(if destination.is_empty() {
        "none"
    } else {
        destination
    })
}

fn nested<'a>(
    resource: &'a ResolvedResource,
    key: &str,
    field: &str,
) -> ProviderResult<&'a PropertyValue> {
    resource
        .get(key)?
        .get(field)
        .ok_or_else(|| missing(resource.urn(), &format!("{}.{}", key, field)))
}

fn nested_str<'a>(
    resource: &'a ResolvedResource,
    key: &str,
    field: &str,
) -> ProviderResult<&'a str> {
    nested(resource, key, field)?
        .as_str()
        .ok_or_else(|| missing(resource.urn(), &format!("{}.{}", key, field)))
}

/// A string input as recorded in state
fn recorded<'a>(prior: &'a ResourceState, key: &str) -> ProviderResult<&'a str> {
    prior.input_str(key).ok_or_else(|| missing(&prior.urn, key))
}

fn missing(urn: &Urn, key: &str) -> ProviderError {
    ProviderError::MissingInput {
        urn: urn.clone(),
        key: key.to_string(),
    }
}

fn not_a_provider_resource(urn: &Urn) -> ProviderError {
    ProviderError::Other(format!("{} is a command, not a provider resource", urn))
}

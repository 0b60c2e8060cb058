//! The collector stack declaration
//!
//! Seven resources in dependency order: resource group, storage account,
//! file share, config upload, managed environment, environment storage and
//! the collector container app. Every cross-resource value is an output
//! reference, so the graph follows from the declaration alone; the only
//! explicit edge is container app -> upload, which carries no data.

use crate::config::{Config, HONEYCOMB_API_KEY};
use crate::domain::entities::Resource;
use crate::domain::value_objects::{ContentHash, PropertyValue, ResourceKind, Secret, Urn};
use crate::error::StackResult;

use super::config_binding::ConfigBinding;
use super::naming::{auto_name, validate_container_app_name, validate_storage_account_name};

/// Name of the published stack output
pub const COLLECTOR_URL: &str = "collector-url";

/// Container app secret holding the Honeycomb key
pub const HONEYCOMB_SECRET_NAME: &str = "honeycomb-api-key";

const CONFIG_VOLUME: &str = "config";

pub struct CollectorStack;

impl CollectorStack {
    /// Logical name of the single resource of `kind`
    pub fn logical_name(kind: ResourceKind) -> &'static str {
        match kind {
            ResourceKind::ResourceGroup => "resourceGroup",
            ResourceKind::StorageAccount => "sa",
            ResourceKind::FileShare => "fileShare",
            ResourceKind::UploadCommand => "config-file-upload",
            ResourceKind::ManagedEnvironment => "collector-env",
            ResourceKind::EnvironmentStorage => "collector-env-storage",
            ResourceKind::ContainerApp => "collector",
        }
    }

    pub fn urn(kind: ResourceKind) -> Urn {
        Urn::new(kind, Self::logical_name(kind))
    }

    /// Binding of the config digest to the container app
    pub fn binding(digest: &ContentHash) -> ConfigBinding {
        ConfigBinding::new(digest.clone(), Self::urn(ResourceKind::ContainerApp))
    }

    /// Declare all resources for `config`, with `digest` taken from the
    /// collector configuration file as it is right now
    pub fn declare(
        config: &Config,
        digest: &ContentHash,
        api_key: Secret,
    ) -> StackResult<Vec<Resource>> {
        let stack = config.stack.name.as_str();
        let binding = Self::binding(digest);

        let rg = Self::urn(ResourceKind::ResourceGroup);
        let sa = Self::urn(ResourceKind::StorageAccount);
        let share = Self::urn(ResourceKind::FileShare);
        let upload = Self::urn(ResourceKind::UploadCommand);
        let env = Self::urn(ResourceKind::ManagedEnvironment);
        let env_storage = Self::urn(ResourceKind::EnvironmentStorage);

        let rg_name = config
            .stack
            .resource_group
            .clone()
            .unwrap_or_else(|| auto_name("otel-rg-", stack, rg.logical()));

        let sa_name = config
            .stack
            .storage_account
            .clone()
            .unwrap_or_else(|| auto_name("otelsa", stack, sa.logical()));
        validate_storage_account_name(&sa_name)?;
        validate_container_app_name(&config.collector.app_name)?;

        let rg_name_ref = || PropertyValue::output(&rg, "name");
        let sa_name_ref = || PropertyValue::output(&sa, "name");
        let sa_key_ref = || PropertyValue::output(&sa, "primaryKey");
        let share_name_ref = || PropertyValue::output(&share, "name");

        let resource_group = Resource::new(ResourceKind::ResourceGroup, rg.logical(), rg_name)
            .input("location", config.stack.location.as_str());

        let storage_account = Resource::new(ResourceKind::StorageAccount, sa.logical(), sa_name)
            .input("resourceGroupName", rg_name_ref())
            .input("location", config.stack.location.as_str())
            .input("kind", "StorageV2")
            .input("sku", config.storage.sku.as_str());

        let file_share = Resource::new(
            ResourceKind::FileShare,
            share.logical(),
            config.storage.share_name.as_str(),
        )
        .input("resourceGroupName", rg_name_ref())
        .input("accountName", sa_name_ref())
        .input("enabledProtocols", "SMB")
        .input("shareQuota", config.storage.share_quota_gib);

        let config_upload = Resource::new(
            ResourceKind::UploadCommand,
            upload.logical(),
            upload.logical(),
        )
        .input("triggers", binding.trigger())
        .input("share", share_name_ref())
        .input("accountName", sa_name_ref())
        .input("accountKey", sa_key_ref())
        .input(
            "source",
            config.collector_config_path().to_string_lossy().into_owned(),
        )
        .deleted_with(&share);

        let environment = Resource::new(
            ResourceKind::ManagedEnvironment,
            env.logical(),
            auto_name("otel-env-", stack, env.logical()),
        )
        .input("resourceGroupName", rg_name_ref())
        .input("location", config.stack.location.as_str())
        .input(
            "appLogsConfiguration",
            PropertyValue::map([("destination", PropertyValue::from(""))]),
        );

        let environment_storage = Resource::new(
            ResourceKind::EnvironmentStorage,
            env_storage.logical(),
            config.storage.storage_name.as_str(),
        )
        .input("resourceGroupName", rg_name_ref())
        .input("environmentName", PropertyValue::output(&env, "name"))
        .input(
            "azureFile",
            PropertyValue::map([
                ("accessMode", config.storage.access_mode.as_str().into()),
                ("shareName", share_name_ref()),
                ("accountName", sa_name_ref()),
                ("accountKey", sa_key_ref()),
            ]),
        );

        let collector = Self::container_app(config, &binding, api_key, &env, &env_storage)
            .input("resourceGroupName", rg_name_ref())
            .depends_on(&upload);

        Ok(vec![
            resource_group,
            storage_account,
            file_share,
            config_upload,
            environment,
            environment_storage,
            collector,
        ])
    }

    fn container_app(
        config: &Config,
        binding: &ConfigBinding,
        api_key: Secret,
        env: &Urn,
        env_storage: &Urn,
    ) -> Resource {
        let collector = &config.collector;
        let app = Self::urn(ResourceKind::ContainerApp);

        let configuration = PropertyValue::map([
            (
                "ingress",
                PropertyValue::map([
                    ("external", true.into()),
                    ("targetPort", collector.target_port.into()),
                ]),
            ),
            (
                "secrets",
                PropertyValue::list([PropertyValue::map([
                    ("name", HONEYCOMB_SECRET_NAME.into()),
                    ("value", api_key.into()),
                ])]),
            ),
        ]);

        let probe = |kind: &str| {
            PropertyValue::map([
                ("type", kind.into()),
                (
                    "httpGet",
                    PropertyValue::map([
                        ("path", collector.health_path.as_str().into()),
                        ("port", collector.health_port.into()),
                    ]),
                ),
            ])
        };

        let container = PropertyValue::map([
            ("name", collector.app_name.as_str().into()),
            ("image", collector.image.as_str().into()),
            (
                "volumeMounts",
                PropertyValue::list([PropertyValue::map([
                    ("volumeName", CONFIG_VOLUME.into()),
                    ("mountPath", collector.mount_path.as_str().into()),
                ])]),
            ),
            (
                "env",
                PropertyValue::list([
                    PropertyValue::map([
                        ("name", HONEYCOMB_API_KEY.into()),
                        ("secretRef", HONEYCOMB_SECRET_NAME.into()),
                    ]),
                    binding.env_var(),
                ]),
            ),
            (
                "probes",
                PropertyValue::list([probe("Readiness"), probe("Liveness")]),
            ),
        ]);

        let template = PropertyValue::map([
            (
                "scale",
                PropertyValue::map([
                    ("minReplicas", collector.min_replicas.into()),
                    ("maxReplicas", collector.max_replicas.into()),
                ]),
            ),
            (
                "volumes",
                PropertyValue::list([PropertyValue::map([
                    ("name", CONFIG_VOLUME.into()),
                    ("storageType", "AzureFile".into()),
                    ("storageName", PropertyValue::output(env_storage, "name")),
                ])]),
            ),
            ("containers", PropertyValue::list([container])),
        ]);

        Resource::new(
            ResourceKind::ContainerApp,
            app.logical(),
            collector.app_name.as_str(),
        )
        .input("environmentId", PropertyValue::output(env, "id"))
        .input("configuration", configuration)
        .input("template", template)
    }
}

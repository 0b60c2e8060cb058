//! Configuration type definitions

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::domain::value_objects::Secret;
use crate::error::{StackError, StackResult};

use super::loader::{self, ConfigWarning};

/// Name of the one secret the collector needs
pub const HONEYCOMB_API_KEY: &str = "HONEYCOMB_API_KEY";

/// `[stack]` - identity, region and where state lives
#[derive(Debug, Clone, Deserialize)]
pub struct StackConfig {
    #[serde(default = "default_stack_name")]
    pub name: String,

    #[serde(default = "default_location")]
    pub location: String,

    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,

    /// Physical name override for the resource group
    #[serde(default)]
    pub resource_group: Option<String>,

    /// Physical name override for the storage account
    #[serde(default)]
    pub storage_account: Option<String>,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            name: default_stack_name(),
            location: default_location(),
            state_dir: default_state_dir(),
            resource_group: None,
            storage_account: None,
        }
    }
}

fn default_stack_name() -> String {
    "dev".to_string()
}

fn default_location() -> String {
    "eastus".to_string()
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(".otelstack")
}

/// `[collector]` - the container app
#[derive(Debug, Clone, Deserialize)]
pub struct CollectorConfig {
    #[serde(default = "default_config_file")]
    pub config_file: PathBuf,

    #[serde(default = "default_image")]
    pub image: String,

    #[serde(default = "default_app_name")]
    pub app_name: String,

    #[serde(default = "default_target_port")]
    pub target_port: u16,

    #[serde(default = "default_health_port")]
    pub health_port: u16,

    #[serde(default = "default_health_path")]
    pub health_path: String,

    #[serde(default = "default_mount_path")]
    pub mount_path: String,

    #[serde(default = "default_replicas")]
    pub min_replicas: u32,

    #[serde(default = "default_replicas")]
    pub max_replicas: u32,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            config_file: default_config_file(),
            image: default_image(),
            app_name: default_app_name(),
            target_port: default_target_port(),
            health_port: default_health_port(),
            health_path: default_health_path(),
            mount_path: default_mount_path(),
            min_replicas: default_replicas(),
            max_replicas: default_replicas(),
        }
    }
}

fn default_config_file() -> PathBuf {
    PathBuf::from("config.yaml")
}

fn default_image() -> String {
    "otel/opentelemetry-collector-contrib:latest".to_string()
}

fn default_app_name() -> String {
    "collector".to_string()
}

fn default_target_port() -> u16 {
    4318
}

fn default_health_port() -> u16 {
    13133
}

fn default_health_path() -> String {
    "/".to_string()
}

fn default_mount_path() -> String {
    "/etc/otelcol-contrib".to_string()
}

fn default_replicas() -> u32 {
    1
}

/// `[storage]` - storage account, share and its environment binding
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_sku")]
    pub sku: String,

    #[serde(default = "default_share_name")]
    pub share_name: String,

    #[serde(default = "default_share_quota")]
    pub share_quota_gib: u32,

    #[serde(default = "default_storage_name")]
    pub storage_name: String,

    #[serde(default)]
    pub access_mode: AccessMode,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sku: default_sku(),
            share_name: default_share_name(),
            share_quota_gib: default_share_quota(),
            storage_name: default_storage_name(),
            access_mode: AccessMode::default(),
        }
    }
}

fn default_sku() -> String {
    "Standard_LRS".to_string()
}

fn default_share_name() -> String {
    "config".to_string()
}

fn default_share_quota() -> u32 {
    5
}

fn default_storage_name() -> String {
    "collector-config".to_string()
}

/// Mount access mode of the environment storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub enum AccessMode {
    #[default]
    ReadWrite,
    ReadOnly,
}

impl AccessMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::ReadWrite => "ReadWrite",
            AccessMode::ReadOnly => "ReadOnly",
        }
    }
}

/// `[az]` - the Azure CLI
#[derive(Debug, Clone, Deserialize)]
pub struct AzConfig {
    #[serde(default = "default_az_program")]
    pub program: PathBuf,
}

impl Default for AzConfig {
    fn default() -> Self {
        Self {
            program: default_az_program(),
        }
    }
}

fn default_az_program() -> PathBuf {
    PathBuf::from("az")
}

/// `[output]`
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub color: ColorMode,

    #[serde(default = "default_true")]
    pub unicode: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: ColorMode::default(),
            unicode: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Color output mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// Main configuration structure (`otelstack.toml`)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub stack: StackConfig,

    #[serde(default)]
    pub collector: CollectorConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub az: AzConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub secrets: BTreeMap<String, Secret>,

    /// Directory relative paths resolve against (the config file's parent)
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> StackResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> StackResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Load `path` if it exists, defaults otherwise; env overrides applied
    pub fn load_or_default(path: &Path) -> StackResult<(Self, Vec<ConfigWarning>)> {
        loader::load_or_default(path)
    }

    /// Apply environment variable overrides (OTELSTACK_* prefix)
    pub fn with_env_overrides(self) -> Self {
        loader::with_env_overrides(self)
    }

    /// Collector configuration file, resolved against `base_dir` and
    /// normalised. Its string form is a diffed upload input, so it must not
    /// depend on how the directory was spelled.
    pub fn collector_config_path(&self) -> PathBuf {
        loader::normalize(&self.base_dir.join(&self.collector.config_file))
    }

    pub fn state_path(&self) -> PathBuf {
        loader::normalize(
            &self
                .base_dir
                .join(&self.stack.state_dir)
                .join(format!("{}.json", self.stack.name)),
        )
    }

    /// Resolve a secret: the environment wins over `[secrets]`
    pub fn require_secret(&self, name: &str) -> StackResult<Secret> {
        self.require_secret_with(name, |key| std::env::var(key).ok())
    }

    pub(crate) fn require_secret_with(
        &self,
        name: &str,
        env: impl Fn(&str) -> Option<String>,
    ) -> StackResult<Secret> {
        env(name)
            .filter(|v| !v.is_empty())
            .map(Secret::new)
            .or_else(|| self.secrets.get(name).filter(|s| !s.is_empty()).cloned())
            .ok_or_else(|| StackError::MissingSecret {
                name: name.to_string(),
            })
    }
}

//! Resource identity
//!
//! A resource is identified across runs by its kind plus a logical name
//! (`container-app::collector`). Physical names live on the resource itself.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The kinds of resource this tool knows how to declare and apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    ResourceGroup,
    StorageAccount,
    FileShare,
    UploadCommand,
    ManagedEnvironment,
    EnvironmentStorage,
    ContainerApp,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::ResourceGroup,
        ResourceKind::StorageAccount,
        ResourceKind::FileShare,
        ResourceKind::UploadCommand,
        ResourceKind::ManagedEnvironment,
        ResourceKind::EnvironmentStorage,
        ResourceKind::ContainerApp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::ResourceGroup => "resource-group",
            ResourceKind::StorageAccount => "storage-account",
            ResourceKind::FileShare => "file-share",
            ResourceKind::UploadCommand => "upload-command",
            ResourceKind::ManagedEnvironment => "managed-environment",
            ResourceKind::EnvironmentStorage => "environment-storage",
            ResourceKind::ContainerApp => "container-app",
        }
    }

    /// Side-effecting commands run through the uploader, not the provider
    pub fn is_command(&self) -> bool {
        matches!(self, ResourceKind::UploadCommand)
    }

    /// Inputs whose change cannot be applied in place
    pub fn replace_keys(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::ResourceGroup => &["location"],
            ResourceKind::StorageAccount => &["resourceGroupName", "location", "kind"],
            ResourceKind::FileShare => &["resourceGroupName", "accountName", "enabledProtocols"],
            ResourceKind::UploadCommand => &[],
            ResourceKind::ManagedEnvironment => &["resourceGroupName", "location"],
            ResourceKind::EnvironmentStorage => &["resourceGroupName", "environmentName"],
            ResourceKind::ContainerApp => &["resourceGroupName", "environmentId"],
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown resource kind '{}'", s))
    }
}

/// Stable identity of a declared resource: `<kind>::<logical name>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Urn {
    kind: ResourceKind,
    logical: String,
}

impl Urn {
    const SEPARATOR: &'static str = "::";

    pub fn new(kind: ResourceKind, logical: impl Into<String>) -> Self {
        Self {
            kind,
            logical: logical.into(),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn logical(&self) -> &str {
        &self.logical
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.kind, Self::SEPARATOR, self.logical)
    }
}

impl FromStr for Urn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, logical) = s
            .split_once(Self::SEPARATOR)
            .ok_or_else(|| format!("malformed urn '{}'", s))?;
        if logical.is_empty() {
            return Err(format!("urn '{}' has an empty logical name", s));
        }
        Ok(Self::new(kind.parse()?, logical))
    }
}

impl TryFrom<String> for Urn {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Urn> for String {
    fn from(urn: Urn) -> Self {
        urn.to_string()
    }
}

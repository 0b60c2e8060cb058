//! In-memory adapters
//!
//! A fake cloud, a recording uploader and a map-backed state store. Clones
//! share the same underlying data, so a test can hand one clone to a use case
//! and inspect another afterwards.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

use crate::domain::entities::{Outputs, ResolvedResource, ResourceState, StateSnapshot};
use crate::domain::ports::{
    CloudProvider, FileUploader, ProviderError, ProviderResult, RemoveRequest, StateLock,
    StateRepository, UploadAction, UploadRequest,
};
use crate::domain::value_objects::{ContentHash, ResourceKind, Secret, StepOp, Urn};
use crate::error::StackResult;

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// One provider call, in the order it was made
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCall {
    pub op: StepOp,
    pub urn: Urn,
}

#[derive(Debug, Clone)]
struct FakeResource {
    name: String,
    /// Request body as the provider saw it (secrets in the clear)
    body: Value,
    outputs: Outputs,
    revision: u32,
}

#[derive(Debug, Default)]
struct FakeCloud {
    resources: BTreeMap<Urn, FakeResource>,
    calls: Vec<ProviderCall>,
    reads: Vec<Urn>,
    failing: HashSet<Urn>,
}

/// Provider that keeps resources in a map and makes up plausible outputs
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    cloud: Arc<Mutex<FakeCloud>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make create/update of `urn` fail until cleared
    pub fn fail_on(&self, urn: &Urn) {
        guard(&self.cloud).failing.insert(urn.clone());
    }

    pub fn clear_failures(&self) {
        guard(&self.cloud).failing.clear();
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        guard(&self.cloud).calls.clone()
    }

    pub fn clear_calls(&self) {
        let mut cloud = guard(&self.cloud);
        cloud.calls.clear();
        cloud.reads.clear();
    }

    /// Resources whose outputs were read back
    pub fn reads(&self) -> Vec<Urn> {
        guard(&self.cloud).reads.clone()
    }

    pub fn exists(&self, urn: &Urn) -> bool {
        guard(&self.cloud).resources.contains_key(urn)
    }

    pub fn len(&self) -> usize {
        guard(&self.cloud).resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Request body last sent for `urn`
    pub fn body(&self, urn: &Urn) -> Option<Value> {
        guard(&self.cloud).resources.get(urn).map(|r| r.body.clone())
    }

    /// Number of creates plus updates applied to `urn` while it existed
    pub fn revision(&self, urn: &Urn) -> Option<u32> {
        guard(&self.cloud).resources.get(urn).map(|r| r.revision)
    }

    fn outputs_for(urn: &Urn, name: &str, revision: u32) -> Outputs {
        let mut outputs = Outputs::new();
        outputs.insert("name".to_string(), name.into());
        outputs.insert(
            "id".to_string(),
            format!("/subscriptions/00000000/{}/{}", urn.kind(), name).into(),
        );

        match urn.kind() {
            ResourceKind::StorageAccount => {
                outputs.insert(
                    "primaryKey".to_string(),
                    Secret::new(format!("key-of-{}", name)).into(),
                );
            }
            ResourceKind::ManagedEnvironment => {
                outputs.insert(
                    "defaultDomain".to_string(),
                    format!("{}.eastus.azurecontainerapps.io", name).into(),
                );
            }
            ResourceKind::ContainerApp => {
                let fqdn = format!("{}.fake.azurecontainerapps.io", name);
                outputs.insert("url".to_string(), format!("https://{}", fqdn).into());
                outputs.insert("fqdn".to_string(), fqdn.into());
                outputs.insert(
                    "latestRevisionName".to_string(),
                    format!("{}--{:07}", name, revision).into(),
                );
            }
            _ => {}
        }
        outputs
    }

    fn body_of(resource: &ResolvedResource) -> Value {
        let body = resource
            .inputs()
            .iter()
            .filter_map(|(k, v)| v.to_exposed_json().map(|j| (k.clone(), j)))
            .collect();
        Value::Object(body)
    }

    fn write(&self, op: StepOp, resource: &ResolvedResource) -> ProviderResult<Outputs> {
        let mut cloud = guard(&self.cloud);
        let urn = resource.urn().clone();
        cloud.calls.push(ProviderCall {
            op,
            urn: urn.clone(),
        });
        if cloud.failing.contains(&urn) {
            return Err(ProviderError::Other(format!("injected failure for {}", urn)));
        }

        let revision = match (op, cloud.resources.get(&urn)) {
            (StepOp::Update, Some(existing)) => existing.revision + 1,
            (StepOp::Update, None) => return Err(ProviderError::NotFound { urn }),
            _ => 1,
        };
        let outputs = Self::outputs_for(&urn, resource.name(), revision);
        cloud.resources.insert(
            urn,
            FakeResource {
                name: resource.name().to_string(),
                body: Self::body_of(resource),
                outputs: outputs.clone(),
                revision,
            },
        );
        Ok(outputs)
    }
}

impl CloudProvider for InMemoryProvider {
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
        let mut cloud = guard(&self.cloud);
        cloud.calls.push(ProviderCall {
            op: StepOp::Delete,
            urn: prior.urn.clone(),
        });
        match cloud.resources.remove(&prior.urn) {
            Some(_) => Ok(()),
            None => Err(ProviderError::NotFound {
                urn: prior.urn.clone(),
            }),
        }
    }

    fn read(&self, prior: &ResourceState) -> ProviderResult<Outputs> {
        let mut cloud = guard(&self.cloud);
        cloud.reads.push(prior.urn.clone());
        match cloud.resources.get(&prior.urn) {
            Some(resource) if resource.name == prior.name => Ok(resource.outputs.clone()),
            _ => Err(ProviderError::NotFound {
                urn: prior.urn.clone(),
            }),
        }
    }
}

/// An upload as the uploader received it
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRecord {
    pub action: UploadAction,
    pub share: String,
    pub account_name: String,
    pub account_key: Secret,
    pub source: PathBuf,
    /// Digest of the source file at the time of the upload
    pub digest: ContentHash,
}

#[derive(Debug, Default)]
struct Uploads {
    uploads: Vec<UploadRecord>,
    removals: Vec<RemoveRequest>,
    /// (share, remote path) -> digest of the stored file
    files: HashMap<(String, String), ContentHash>,
    failing: bool,
}

/// Uploader that hashes the source instead of sending it anywhere
#[derive(Debug, Clone, Default)]
pub struct RecordingUploader {
    inner: Arc<Mutex<Uploads>>,
}

impl RecordingUploader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every upload exit unsuccessfully
    pub fn set_failing(&self, failing: bool) {
        guard(&self.inner).failing = failing;
    }

    pub fn uploads(&self) -> Vec<UploadRecord> {
        guard(&self.inner).uploads.clone()
    }

    pub fn removals(&self) -> Vec<RemoveRequest> {
        guard(&self.inner).removals.clone()
    }

    pub fn clear(&self) {
        let mut inner = guard(&self.inner);
        inner.uploads.clear();
        inner.removals.clear();
    }

    /// Digest of the file currently stored at `share/remote_path`
    pub fn stored(&self, share: &str, remote_path: &str) -> Option<ContentHash> {
        guard(&self.inner)
            .files
            .get(&(share.to_string(), remote_path.to_string()))
            .cloned()
    }
}

impl FileUploader for RecordingUploader {
    fn upload(&self, request: &UploadRequest) -> ProviderResult<()> {
        let digest = ContentHash::from_reader(BufReader::new(File::open(&request.source)?))?;
        let mut inner = guard(&self.inner);
        if inner.failing {
            return Err(ProviderError::CommandFailed {
                program: "az".to_string(),
                args: format!("storage file upload -s {} --account-key ***", request.share),
                code: Some(1),
                stderr: "upload refused".to_string(),
            });
        }

        inner.files.insert(
            (request.share.clone(), request.remote_path()),
            digest.clone(),
        );
        inner.uploads.push(UploadRecord {
            action: request.action,
            share: request.share.clone(),
            account_name: request.account_name.clone(),
            account_key: request.account_key.clone(),
            source: request.source.clone(),
            digest,
        });
        Ok(())
    }

    fn remove(&self, request: &RemoveRequest) -> ProviderResult<()> {
        let mut inner = guard(&self.inner);
        inner
            .files
            .remove(&(request.share.clone(), request.remote_path.clone()));
        inner.removals.push(request.clone());
        Ok(())
    }
}

/// State kept in a map keyed by path
#[derive(Debug, Clone, Default)]
pub struct InMemoryStateRepository {
    snapshots: Arc<Mutex<HashMap<PathBuf, StateSnapshot>>>,
    saves: Arc<Mutex<usize>>,
}

impl InMemoryStateRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self, path: &Path) -> Option<StateSnapshot> {
        guard(&self.snapshots).get(path).cloned()
    }

    pub fn save_count(&self) -> usize {
        *guard(&self.saves)
    }
}

impl StateRepository for InMemoryStateRepository {
    fn lock(&self, _path: &Path) -> StackResult<StateLock> {
        Ok(StateLock::none())
    }

    fn load(&self, path: &Path, stack: &str) -> StackResult<StateSnapshot> {
        Ok(self
            .snapshot(path)
            .unwrap_or_else(|| StateSnapshot::new(stack)))
    }

    fn save(&self, state: &StateSnapshot, path: &Path) -> StackResult<()> {
        guard(&self.snapshots).insert(path.to_path_buf(), state.clone());
        *guard(&self.saves) += 1;
        Ok(())
    }
}

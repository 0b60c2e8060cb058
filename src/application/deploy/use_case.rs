//! Deploy Use Case
//!
//! Orchestrates a run:
//! 1. Hash the collector configuration (fatal if unreadable)
//! 2. Declare the stack and lock/load the state snapshot
//! 3. Plan the diff
//! 4. Execute steps one at a time, saving state after each
//! 5. Record stack outputs
//!
//! The first failing step stops the run; nothing that depends on it runs.
//! Re-running the same declaration resumes from the saved state.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::detector::ConfigChangeDetector;
use crate::config::{Config, HONEYCOMB_API_KEY};
use crate::domain::entities::{
    Outputs, ResolvedResource, Resource, ResourceState, StateSnapshot,
};
use crate::domain::ports::{
    remote_file_name, CloudProvider, DeployEvent, DeployEventSink, FileUploader,
    NoopEventSink, ProviderError, ProviderResult, RemoveRequest, StateLock, StateRepository,
    UploadAction, UploadRequest,
};
use crate::domain::services::{
    validate_stack_name, CollectorStack, PlannedStep, Planner, COLLECTOR_URL,
};
use crate::domain::value_objects::{
    ContentHash, Fingerprint, OutputRef, PropertyValue, ResourceKind, StepOp, Urn,
};
use crate::error::{StackError, StackResult};

use super::options::RunKind;
use super::result::{DeployResult, PreparedRun, Preview};

/// Deploy use case - plans and applies the collector stack
///
/// Parameterized by its ports so tests can run it fully in memory.
pub struct DeployUseCase<P, U, S>
where
    P: CloudProvider,
    U: FileUploader,
    S: StateRepository,
{
    provider: P,
    uploader: U,
    state_repo: S,
    events: Arc<dyn DeployEventSink>,
    interrupted: Arc<AtomicBool>,
}

impl<P, U, S> DeployUseCase<P, U, S>
where
    P: CloudProvider,
    U: FileUploader,
    S: StateRepository,
{
    pub fn new(provider: P, uploader: U, state_repo: S) -> Self {
        Self {
            provider,
            uploader,
            state_repo,
            events: Arc::new(NoopEventSink),
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Report progress to `sink`
    pub fn with_events(mut self, sink: Arc<dyn DeployEventSink>) -> Self {
        self.events = sink;
        self
    }

    /// Stop before the next step once `flag` is set (Ctrl-C)
    pub fn with_interrupt_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupted = flag;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn uploader(&self) -> &U {
        &self.uploader
    }

    pub fn state_repository(&self) -> &S {
        &self.state_repo
    }

    /// Plan only: no lock, no provider or uploader calls
    pub fn preview(&self, config: &Config) -> StackResult<Preview> {
        let (resources, digest) = self.declare(config)?;
        let run = self.prepare(config, RunKind::Preview, resources, Some(digest.clone()))?;
        Ok(Preview {
            config_changed: ConfigChangeDetector::has_changed(&digest, &run.state),
            plan: run.plan,
            digest,
        })
    }

    /// Plan an `up`, holding the state lock until applied or dropped
    pub fn prepare_up(&self, config: &Config) -> StackResult<PreparedRun> {
        let (resources, digest) = self.declare(config)?;
        self.prepare(config, RunKind::Up, resources, Some(digest))
    }

    /// Plan a `destroy`, holding the state lock until applied or dropped
    pub fn prepare_destroy(&self, config: &Config) -> StackResult<PreparedRun> {
        self.prepare(config, RunKind::Destroy, Vec::new(), None)
    }

    pub fn up(&self, config: &Config) -> StackResult<DeployResult> {
        let run = self.prepare_up(config)?;
        self.apply(run)
    }

    pub fn destroy(&self, config: &Config) -> StackResult<DeployResult> {
        let run = self.prepare_destroy(config)?;
        self.apply(run)
    }

    /// Stack outputs recorded by the last run
    pub fn outputs(&self, config: &Config) -> StackResult<BTreeMap<String, Fingerprint>> {
        let state = self
            .state_repo
            .load(&state_path(config)?, &config.stack.name)?;
        Ok(state.outputs().clone())
    }

    /// Hash the collector config and declare the stack. Runs before any
    /// state or provider access, so an unreadable file aborts cleanly.
    fn declare(&self, config: &Config) -> StackResult<(Vec<Resource>, ContentHash)> {
        let config_path = config.collector_config_path();
        let digest = ConfigChangeDetector::digest(&config_path)?;
        debug!(path = %config_path.display(), %digest, "hashed collector config");
        let api_key = config.require_secret(HONEYCOMB_API_KEY)?;
        let resources = CollectorStack::declare(config, &digest, api_key)?;
        Ok((resources, digest))
    }

    fn prepare(
        &self,
        config: &Config,
        kind: RunKind,
        resources: Vec<Resource>,
        digest: Option<ContentHash>,
    ) -> StackResult<PreparedRun> {
        let state_path = state_path(config)?;
        let lock = if kind.locks_state() {
            self.state_repo.lock(&state_path)?
        } else {
            StateLock::none()
        };
        let state = self.state_repo.load(&state_path, &config.stack.name)?;

        self.events.on_event(DeployEvent::Started {
            command: kind.as_str(),
            stack: config.stack.name.clone(),
            resource_count: match kind {
                RunKind::Destroy => state.len(),
                _ => resources.len(),
            },
        });
        if let Some(digest) = &digest {
            self.events.on_event(DeployEvent::ConfigHashed {
                path: config.collector_config_path().display().to_string(),
                hash: digest.clone(),
            });
        }

        let plan = match kind {
            RunKind::Destroy => Planner::plan_destroy(&state)?,
            RunKind::Preview | RunKind::Up => Planner::plan(&resources, &state)?,
        };
        self.events.on_event(DeployEvent::Planned {
            creates: plan.count(StepOp::Create),
            updates: plan.count(StepOp::Update),
            replaces: plan.count(StepOp::Replace),
            deletes: plan.count(StepOp::Delete),
            unchanged: plan.count(StepOp::Same),
        });
        info!(
            stack = %config.stack.name,
            command = kind.as_str(),
            changes = plan.change_count(),
            "plan ready"
        );

        Ok(PreparedRun {
            kind,
            _lock: lock,
            state_path,
            state,
            resources,
            plan,
            digest,
        })
    }

    /// Execute a prepared run
    pub fn apply(&self, run: PreparedRun) -> StackResult<DeployResult> {
        let PreparedRun {
            kind,
            _lock,
            state_path,
            mut state,
            resources,
            plan,
            digest,
        } = run;

        let by_urn: HashMap<&Urn, &Resource> = resources.iter().map(|r| (r.urn(), r)).collect();
        let deleting: HashSet<&Urn> = plan
            .steps()
            .iter()
            .filter(|s| s.op == StepOp::Delete)
            .map(|s| &s.urn)
            .collect();
        let mut live: HashMap<Urn, Outputs> = HashMap::new();
        let mut result = DeployResult::new(kind, digest);

        for (index, step) in plan.steps().iter().enumerate() {
            if !step.is_change() {
                result.unchanged.push(step.urn.clone());
                continue;
            }
            if self.interrupted.load(Ordering::SeqCst) {
                warn!(next = %step.urn, "interrupted before step");
                return Err(StackError::Interrupted);
            }

            let resource = by_urn.get(&step.urn).copied();
            if step.op != StepOp::Delete && resource.is_none() {
                debug!(urn = %step.urn, "no declaration for planned step");
                continue;
            }

            self.events.on_event(DeployEvent::StepStarted {
                index,
                urn: step.urn.clone(),
                op: step.op,
            });

            let outcome = match resource {
                Some(resource) if step.op != StepOp::Delete => {
                    self.apply_step(step, resource, &mut state, &mut live)
                }
                _ => self
                    .delete_step(step, &mut state, &deleting, &live)
                    .map(|()| StepOp::Delete),
            };

            match outcome {
                Ok(op) => {
                    self.state_repo.save(&state, &state_path)?;
                    debug!(urn = %step.urn, %op, "state saved");
                    self.events.on_event(DeployEvent::StepCompleted {
                        index,
                        urn: step.urn.clone(),
                        op,
                    });
                    result.changed.push((step.urn.clone(), op));
                }
                Err(err) => {
                    warn!(urn = %step.urn, op = %step.op, "step failed");
                    self.events.on_event(DeployEvent::StepFailed {
                        index,
                        urn: step.urn.clone(),
                        op: step.op,
                        error: err.to_string(),
                    });
                    return Err(err);
                }
            }
        }

        Self::record_outputs(&mut state);
        self.state_repo.save(&state, &state_path)?;

        for (name, value) in state.outputs() {
            self.events.on_event(DeployEvent::Output {
                name: name.clone(),
                value: value
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| value.to_string()),
            });
        }
        result.outputs = state.outputs().clone();

        self.events.on_event(DeployEvent::Completed {
            changed: result.changed.len(),
            unchanged: result.unchanged.len(),
        });
        info!(
            command = kind.as_str(),
            changed = result.changed.len(),
            unchanged = result.unchanged.len(),
            "run complete"
        );
        Ok(result)
    }

    fn apply_step(
        &self,
        step: &PlannedStep,
        resource: &Resource,
        state: &mut StateSnapshot,
        live: &mut HashMap<Urn, Outputs>,
    ) -> StackResult<StepOp> {
        let resolved = self.resolve(resource, state, live)?;
        let prior = state.get(resource.urn()).cloned();
        let op = match &prior {
            Some(prior) => Planner::refine(step.op, &resolved, prior),
            None => StepOp::Create,
        };
        if op != step.op {
            info!(urn = %resource.urn(), planned = %step.op, %op, "resolved inputs change the step");
        }

        let fail = |source| StackError::StepFailed {
            urn: resource.urn().clone(),
            op,
            source,
        };

        let outputs = if resource.kind().is_command() {
            self.run_upload(op, &resolved).map_err(fail)?;
            Outputs::new()
        } else {
            let applied = match (op, &prior) {
                (StepOp::Update, Some(prior)) => self.provider.update(&resolved, prior),
                (StepOp::Replace, Some(prior)) => self
                    .delete_resource(prior)
                    .and_then(|()| self.provider.create(&resolved)),
                _ => self.provider.create(&resolved),
            };
            applied.map_err(fail)?
        };

        live.insert(resource.urn().clone(), outputs.clone());
        state.upsert(ResourceState::applied(
            &resolved,
            &outputs,
            resource.dependencies(),
            resource.deleted_with_target().cloned(),
        ));
        Ok(op)
    }

    fn delete_step(
        &self,
        step: &PlannedStep,
        state: &mut StateSnapshot,
        deleting: &HashSet<&Urn>,
        live: &HashMap<Urn, Outputs>,
    ) -> StackResult<()> {
        let Some(prior) = state.get(&step.urn).cloned() else {
            return Ok(());
        };
        let fail = |source| StackError::StepFailed {
            urn: step.urn.clone(),
            op: StepOp::Delete,
            source,
        };

        if prior.urn.kind().is_command() {
            let goes_with_target = prior
                .deleted_with
                .as_ref()
                .is_some_and(|target| deleting.contains(target));
            if goes_with_target {
                debug!(urn = %prior.urn, "remote file is removed with its share");
            } else {
                self.remove_upload(&prior, state, live).map_err(fail)?;
            }
        } else {
            self.delete_resource(&prior).map_err(fail)?;
        }

        state.remove(&step.urn);
        Ok(())
    }

    fn delete_resource(&self, prior: &ResourceState) -> ProviderResult<()> {
        match self.provider.delete(prior) {
            Err(ProviderError::NotFound { urn }) => {
                debug!(%urn, "already gone");
                Ok(())
            }
            other => other,
        }
    }

    fn run_upload(&self, op: StepOp, resolved: &ResolvedResource) -> ProviderResult<()> {
        let request = UploadRequest {
            action: UploadAction::for_op(op).unwrap_or(UploadAction::Create),
            share: resolved.str("share")?.to_string(),
            account_name: resolved.str("accountName")?.to_string(),
            account_key: resolved.secret("accountKey")?.clone(),
            source: resolved.str("source")?.into(),
        };
        info!(
            action = request.action.as_str(),
            share = %request.share,
            account = %request.account_name,
            "uploading collector config"
        );
        self.uploader.upload(&request)
    }

    /// Remove the uploaded file from a share that stays. The account key is
    /// not in state, so it is read back from the storage account.
    fn remove_upload(
        &self,
        prior: &ResourceState,
        state: &StateSnapshot,
        live: &HashMap<Urn, Outputs>,
    ) -> ProviderResult<()> {
        let account = prior
            .dependencies
            .iter()
            .filter_map(|urn| state.get(urn))
            .find(|rs| rs.urn.kind() == ResourceKind::StorageAccount);
        let Some(account) = account else {
            debug!(urn = %prior.urn, "storage account gone; nothing to remove");
            return Ok(());
        };

        let outputs = match live.get(&account.urn) {
            Some(outputs) => outputs.clone(),
            None => self.provider.read(account)?,
        };
        let account_key = outputs
            .get("primaryKey")
            .and_then(PropertyValue::as_secret)
            .cloned()
            .ok_or_else(|| ProviderError::InvalidResponse {
                urn: account.urn.clone(),
                message: "no primaryKey output".to_string(),
            })?;

        let recorded = |key: &str| {
            prior
                .input_str(key)
                .map(str::to_string)
                .ok_or_else(|| ProviderError::MissingInput {
                    urn: prior.urn.clone(),
                    key: key.to_string(),
                })
        };
        let source = recorded("source")?;

        self.uploader.remove(&RemoveRequest {
            share: recorded("share")?,
            account_name: recorded("accountName")?,
            account_key,
            remote_path: remote_file_name(Path::new(&source)),
        })
    }

    /// Substitute every output reference, reading outputs of resources that
    /// were not touched in this run from the provider
    fn resolve(
        &self,
        resource: &Resource,
        state: &StateSnapshot,
        live: &mut HashMap<Urn, Outputs>,
    ) -> StackResult<ResolvedResource> {
        let mut inputs = BTreeMap::new();
        for (key, value) in resource.inputs() {
            let resolved =
                value.resolve(&mut |r: &OutputRef| self.output_of(resource.urn(), r, state, live))?;
            inputs.insert(key.clone(), resolved);
        }
        Ok(ResolvedResource::new(
            resource.urn().clone(),
            resource.name(),
            inputs,
        ))
    }

    fn output_of(
        &self,
        from: &Urn,
        reference: &OutputRef,
        state: &StateSnapshot,
        live: &mut HashMap<Urn, Outputs>,
    ) -> StackResult<PropertyValue> {
        if !live.contains_key(&reference.urn) {
            if let Some(prior) = state.get(&reference.urn) {
                debug!(urn = %reference.urn, "reading outputs of unchanged resource");
                let outputs =
                    self.provider
                        .read(prior)
                        .map_err(|source| StackError::ReadFailed {
                            urn: reference.urn.clone(),
                            source,
                        })?;
                live.insert(reference.urn.clone(), outputs);
            }
        }

        live.get(&reference.urn)
            .and_then(|outputs| outputs.get(&reference.key))
            .cloned()
            .ok_or_else(|| StackError::UnresolvedOutput {
                urn: from.clone(),
                source_urn: reference.urn.clone(),
                key: reference.key.clone(),
            })
    }

    fn record_outputs(state: &mut StateSnapshot) {
        let url = state
            .get(&CollectorStack::urn(ResourceKind::ContainerApp))
            .and_then(|app| app.outputs.get("url"))
            .cloned();
        state.clear_outputs();
        if let Some(url) = url {
            state.set_output(COLLECTOR_URL, url);
        }
    }
}


/// The state file path; the stack name is checked first since it becomes a
/// file name
fn state_path(config: &Config) -> StackResult<PathBuf> {
    validate_stack_name(&config.stack.name)?;
    Ok(config.state_path())
}

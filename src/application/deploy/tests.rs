//! Deploy Use Case Tests

use super::*;
use crate::application::ConfigChangeDetector;
use crate::config::{Config, HONEYCOMB_API_KEY};
use crate::domain::entities::StateSnapshot;
use crate::domain::ports::{CloudProvider, DeployEvent, DeployEventSink, UploadAction};
use crate::domain::services::{CollectorStack, COLLECTOR_URL, CONFIG_FILE_HASH};
use crate::domain::value_objects::{ContentHash, ResourceKind, Secret, StepOp, Urn};
use crate::error::StackError;
use crate::infrastructure::memory::ProviderCall;
use crate::infrastructure::{InMemoryProvider, InMemoryStateRepository, RecordingUploader};
use std::fs;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, TempDir};

type TestUseCase = DeployUseCase<InMemoryProvider, RecordingUploader, InMemoryStateRepository>;

/// Test event sink that records all events
#[derive(Default)]
struct RecordingEventSink {
    events: Mutex<Vec<DeployEvent>>,
}

impl RecordingEventSink {
    fn events(&self) -> Vec<DeployEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl DeployEventSink for RecordingEventSink {
    fn on_event(&self, event: DeployEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Raises the interrupt flag after `after` completed steps
struct InterruptAfter {
    flag: Arc<AtomicBool>,
    after: usize,
    completed: AtomicUsize,
}

impl DeployEventSink for InterruptAfter {
    fn on_event(&self, event: DeployEvent) {
        if let DeployEvent::StepCompleted { .. } = event {
            if self.completed.fetch_add(1, Ordering::SeqCst) + 1 >= self.after {
                self.flag.store(true, Ordering::SeqCst);
            }
        }
    }
}

struct Fixture {
    _dir: TempDir,
    config: Config,
    provider: InMemoryProvider,
    uploader: RecordingUploader,
    state: InMemoryStateRepository,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let mut config = Config {
            base_dir: dir.path().to_path_buf(),
            ..Config::default()
        };
        config
            .secrets
            .insert(HONEYCOMB_API_KEY.to_string(), Secret::new("hc-test-key"));

        let fixture = Self {
            _dir: dir,
            config,
            provider: InMemoryProvider::new(),
            uploader: RecordingUploader::new(),
            state: InMemoryStateRepository::new(),
        };
        fixture.write_config("X");
        fixture
    }

    fn write_config(&self, content: &str) {
        fs::write(self.config.collector_config_path(), content).unwrap();
    }

    fn use_case(&self) -> TestUseCase {
        DeployUseCase::new(
            self.provider.clone(),
            self.uploader.clone(),
            self.state.clone(),
        )
    }

    fn up(&self) -> DeployResult {
        self.use_case().up(&self.config).unwrap()
    }

    fn snapshot(&self) -> StateSnapshot {
        self.state.snapshot(&self.config.state_path()).unwrap()
    }

    fn api_key(&self) -> Secret {
        self.config.require_secret(HONEYCOMB_API_KEY).unwrap()
    }

    /// Start the next run with empty call logs
    fn reset_logs(&self) {
        self.provider.clear_calls();
        self.uploader.clear();
    }
}

fn urn(kind: ResourceKind) -> Urn {
    CollectorStack::urn(kind)
}

fn hash_env_value(provider: &InMemoryProvider) -> Option<String> {
    let body = provider.body(&urn(ResourceKind::ContainerApp))?;
    body["template"]["containers"][0]["env"]
        .as_array()?
        .iter()
        .find(|e| e["name"] == CONFIG_FILE_HASH)
        .and_then(|e| e["value"].as_str())
        .map(str::to_string)
}

#[test]
fn first_up_creates_everything_in_dependency_order() {
    let fx = Fixture::new();
    let result = fx.up();

    let expected: Vec<(Urn, StepOp)> = [
        ResourceKind::ResourceGroup,
        ResourceKind::StorageAccount,
        ResourceKind::FileShare,
        ResourceKind::UploadCommand,
        ResourceKind::ManagedEnvironment,
        ResourceKind::EnvironmentStorage,
        ResourceKind::ContainerApp,
    ]
    .into_iter()
    .map(|k| (urn(k), StepOp::Create))
    .collect();
    assert_eq!(result.changed, expected);

    let uploads = fx.uploader.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].action, UploadAction::Create);
    assert_eq!(uploads[0].digest, ContentHash::from_bytes(b"X"));
    assert_eq!(uploads[0].share, "config");

    assert_eq!(
        hash_env_value(&fx.provider).as_deref(),
        Some(ContentHash::from_bytes(b"X").hex())
    );
    assert_eq!(
        result.outputs[COLLECTOR_URL],
        "https://collector.fake.azurecontainerapps.io"
    );
    // one save per step plus the final outputs save
    assert_eq!(fx.state.save_count(), 8);
}

#[test]
fn upload_uses_storage_account_key_from_outputs() {
    let fx = Fixture::new();
    fx.up();

    let sa = fx.snapshot();
    let account = sa.get(&urn(ResourceKind::StorageAccount)).unwrap();
    let upload = &fx.uploader.uploads()[0];
    assert_eq!(upload.account_name, account.name);
    assert_eq!(
        upload.account_key.expose(),
        format!("key-of-{}", account.name)
    );
}

#[test]
fn unchanged_config_is_a_no_op() {
    let fx = Fixture::new();
    fx.up();
    fx.reset_logs();

    let result = fx.up();

    assert!(!result.has_changes());
    assert_eq!(result.unchanged.len(), 7);
    assert!(fx.provider.calls().is_empty());
    assert!(fx.provider.reads().is_empty());
    assert!(fx.uploader.uploads().is_empty());
    assert_eq!(
        result.outputs[COLLECTOR_URL],
        "https://collector.fake.azurecontainerapps.io"
    );
}

#[test]
fn same_file_through_another_directory_spelling_is_a_no_op() {
    let mut fx = Fixture::new();
    fx.up();
    let base = fx.config.base_dir.clone();

    for spelling in [base.join("."), base.join("nested").join("..")] {
        fx.reset_logs();
        fx.config.base_dir = spelling;

        let result = fx.up();

        assert!(!result.has_changes(), "{:?}", result.changed);
        assert!(fx.uploader.uploads().is_empty());
        assert!(fx.provider.calls().is_empty());
    }
}

#[test]
fn stack_name_that_escapes_the_state_dir_is_refused() {
    let mut fx = Fixture::new();

    for name in ["../escape", ""] {
        fx.config.stack.name = name.to_string();
        let err = fx.use_case().up(&fx.config).unwrap_err();
        assert!(
            matches!(err, StackError::InvalidName { ref kind, .. } if kind == "stack"),
            "{name}: {err}"
        );
        assert!(fx.use_case().outputs(&fx.config).is_err());
    }
    assert_eq!(fx.state.save_count(), 0);
    assert!(fx.provider.calls().is_empty());
}

#[test]
fn config_change_reuploads_and_rolls_a_revision() {
    let fx = Fixture::new();
    fx.up();
    fx.reset_logs();
    fx.write_config("Y");

    let result = fx.up();

    assert_eq!(
        result.changed,
        vec![
            (urn(ResourceKind::UploadCommand), StepOp::Update),
            (urn(ResourceKind::ContainerApp), StepOp::Update),
        ]
    );
    let uploads = fx.uploader.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].action, UploadAction::Update);
    assert_eq!(
        fx.uploader.stored("config", "config.yaml"),
        Some(ContentHash::from_bytes(b"Y"))
    );

    assert_eq!(
        fx.provider.calls(),
        vec![ProviderCall {
            op: StepOp::Update,
            urn: urn(ResourceKind::ContainerApp),
        }]
    );
    assert_eq!(fx.provider.revision(&urn(ResourceKind::ContainerApp)), Some(2));
    assert_eq!(
        hash_env_value(&fx.provider).as_deref(),
        Some(ContentHash::from_bytes(b"Y").hex())
    );
    assert_eq!(
        ConfigChangeDetector::recorded(&fx.snapshot()),
        Some(ContentHash::from_bytes(b"Y"))
    );
}

#[test]
fn unchanged_dependencies_are_read_back_not_touched() {
    let fx = Fixture::new();
    fx.up();
    fx.reset_logs();
    fx.write_config("Y");

    fx.up();

    let reads = fx.provider.reads();
    assert!(reads.contains(&urn(ResourceKind::StorageAccount)));
    assert!(reads.contains(&urn(ResourceKind::FileShare)));
    assert!(reads.contains(&urn(ResourceKind::ManagedEnvironment)));
    // each resource is read at most once per run
    let mut unique = reads.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), reads.len());
}

#[test]
fn failed_upload_leaves_app_and_recorded_digest_alone() {
    let fx = Fixture::new();
    fx.up();
    fx.reset_logs();
    fx.write_config("Y");
    fx.uploader.set_failing(true);

    let events = Arc::new(RecordingEventSink::default());
    let err = fx
        .use_case()
        .with_events(events.clone())
        .up(&fx.config)
        .unwrap_err();

    match err {
        StackError::StepFailed { urn: failed, op, .. } => {
            assert_eq!(failed, urn(ResourceKind::UploadCommand));
            assert_eq!(op, StepOp::Update);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(fx.provider.calls().is_empty());
    assert_eq!(fx.provider.revision(&urn(ResourceKind::ContainerApp)), Some(1));
    assert_eq!(
        hash_env_value(&fx.provider).as_deref(),
        Some(ContentHash::from_bytes(b"X").hex())
    );
    assert_eq!(
        ConfigChangeDetector::recorded(&fx.snapshot()),
        Some(ContentHash::from_bytes(b"X"))
    );
    assert!(events
        .events()
        .iter()
        .any(|e| matches!(e, DeployEvent::StepFailed { .. })));
    assert!(!events
        .events()
        .iter()
        .any(|e| matches!(e, DeployEvent::Completed { .. })));

    // the retry picks up exactly where the failure left off
    fx.uploader.set_failing(false);
    let result = fx.up();
    assert_eq!(
        result.op_of(&urn(ResourceKind::UploadCommand)),
        Some(StepOp::Update)
    );
    assert_eq!(
        result.op_of(&urn(ResourceKind::ContainerApp)),
        Some(StepOp::Update)
    );
    assert_eq!(fx.provider.revision(&urn(ResourceKind::ContainerApp)), Some(2));
}

#[test]
fn provider_failure_stops_the_run() {
    let fx = Fixture::new();
    fx.provider.fail_on(&urn(ResourceKind::ManagedEnvironment));

    let err = fx.use_case().up(&fx.config).unwrap_err();

    assert!(matches!(err, StackError::StepFailed { .. }));
    let state = fx.snapshot();
    assert!(state.contains(&urn(ResourceKind::UploadCommand)));
    assert!(!state.contains(&urn(ResourceKind::ManagedEnvironment)));
    assert!(!fx.provider.exists(&urn(ResourceKind::ContainerApp)));
}

#[test]
fn interrupt_stops_between_steps_and_resumes() {
    let fx = Fixture::new();
    let flag = Arc::new(AtomicBool::new(false));
    let sink = Arc::new(InterruptAfter {
        flag: flag.clone(),
        after: 2,
        completed: AtomicUsize::new(0),
    });

    let err = fx
        .use_case()
        .with_events(sink)
        .with_interrupt_flag(flag)
        .up(&fx.config)
        .unwrap_err();

    assert!(matches!(err, StackError::Interrupted));
    let state = fx.snapshot();
    assert_eq!(state.len(), 2);
    assert!(state.contains(&urn(ResourceKind::StorageAccount)));

    let result = fx.up();
    assert_eq!(result.unchanged.len(), 2);
    assert_eq!(result.count(StepOp::Create), 5);
}

#[test]
fn preview_reports_without_side_effects() {
    let fx = Fixture::new();
    fx.up();
    fx.reset_logs();
    let saves = fx.state.save_count();

    let unchanged = fx.use_case().preview(&fx.config).unwrap();
    assert!(!unchanged.config_changed);
    assert!(!unchanged.plan.has_changes());

    fx.write_config("Y");
    let preview = fx.use_case().preview(&fx.config).unwrap();
    assert!(preview.config_changed);
    assert_eq!(preview.digest, ContentHash::from_bytes(b"Y"));
    assert_eq!(
        preview.plan.op(&urn(ResourceKind::UploadCommand)),
        Some(StepOp::Update)
    );
    assert_eq!(
        preview.plan.op(&urn(ResourceKind::ContainerApp)),
        Some(StepOp::Update)
    );

    assert!(fx.provider.calls().is_empty());
    assert!(fx.provider.reads().is_empty());
    assert!(fx.uploader.uploads().is_empty());
    assert_eq!(fx.state.save_count(), saves);
}

#[test]
fn unreadable_config_aborts_before_any_change() {
    let fx = Fixture::new();
    fs::remove_file(fx.config.collector_config_path()).unwrap();

    let err = fx.use_case().up(&fx.config).unwrap_err();

    assert!(matches!(err, StackError::ConfigFileUnreadable { .. }));
    assert_eq!(fx.state.save_count(), 0);
    assert!(fx.provider.calls().is_empty());
    assert!(fx.uploader.uploads().is_empty());
}

#[test]
fn destroy_removes_dependents_first() {
    let fx = Fixture::new();
    fx.up();
    fx.reset_logs();

    let result = fx.use_case().destroy(&fx.config).unwrap();

    let deleted: Vec<Urn> = fx.provider.calls().into_iter().map(|c| c.urn).collect();
    assert_eq!(
        deleted,
        vec![
            urn(ResourceKind::ContainerApp),
            urn(ResourceKind::EnvironmentStorage),
            urn(ResourceKind::ManagedEnvironment),
            urn(ResourceKind::FileShare),
            urn(ResourceKind::StorageAccount),
            urn(ResourceKind::ResourceGroup),
        ]
    );
    assert_eq!(result.count(StepOp::Delete), 7);
    // the uploaded file goes away with its share
    assert!(fx.uploader.removals().is_empty());
    assert!(fx.provider.is_empty());
    assert!(fx.snapshot().is_empty());
    assert!(fx.snapshot().outputs().is_empty());
}

#[test]
fn destroy_tolerates_resources_already_gone() {
    let fx = Fixture::new();
    fx.up();
    let app = fx.snapshot().get(&urn(ResourceKind::ContainerApp)).cloned().unwrap();
    fx.provider.delete(&app).unwrap();

    let result = fx.use_case().destroy(&fx.config).unwrap();

    assert_eq!(
        result.op_of(&urn(ResourceKind::ContainerApp)),
        Some(StepOp::Delete)
    );
    assert!(fx.snapshot().is_empty());
}

#[test]
fn vanished_dependency_fails_the_read() {
    let fx = Fixture::new();
    fx.up();
    let account = fx
        .snapshot()
        .get(&urn(ResourceKind::StorageAccount))
        .cloned()
        .unwrap();
    fx.provider.delete(&account).unwrap();
    fx.write_config("Y");

    let err = fx.use_case().up(&fx.config).unwrap_err();

    match err {
        StackError::ReadFailed { urn: failed, .. } => {
            assert_eq!(failed, urn(ResourceKind::StorageAccount))
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(fx.uploader.uploads().len() == 1);
}

#[test]
fn renaming_the_share_replaces_it_and_reuploads() {
    let mut fx = Fixture::new();
    fx.up();
    fx.reset_logs();
    fx.config.storage.share_name = "collector".to_string();

    let result = fx.up();

    assert_eq!(
        result.op_of(&urn(ResourceKind::FileShare)),
        Some(StepOp::Replace)
    );
    assert_eq!(
        result.op_of(&urn(ResourceKind::UploadCommand)),
        Some(StepOp::Update)
    );
    assert_eq!(
        result.op_of(&urn(ResourceKind::EnvironmentStorage)),
        Some(StepOp::Update)
    );
    assert_eq!(result.op_of(&urn(ResourceKind::StorageAccount)), None);

    let share_calls: Vec<StepOp> = fx
        .provider
        .calls()
        .into_iter()
        .filter(|c| c.urn == urn(ResourceKind::FileShare))
        .map(|c| c.op)
        .collect();
    assert_eq!(share_calls, vec![StepOp::Delete, StepOp::Create]);
    assert_eq!(
        fx.uploader.stored("collector", "config.yaml"),
        Some(ContentHash::from_bytes(b"X"))
    );
    assert_eq!(
        fx.snapshot()
            .get(&urn(ResourceKind::FileShare))
            .map(|s| s.name.as_str()),
        Some("collector")
    );
}

#[test]
fn secrets_stay_out_of_state_events_and_outputs() {
    let fx = Fixture::new();
    let events = Arc::new(RecordingEventSink::default());
    let result = fx
        .use_case()
        .with_events(events.clone())
        .up(&fx.config)
        .unwrap();

    let api_key = fx.api_key();
    let state = fx.snapshot();
    let account = state.get(&urn(ResourceKind::StorageAccount)).unwrap();
    let storage_key = format!("key-of-{}", account.name);

    let state_json = serde_json::to_string(&state).unwrap();
    let events_text = format!("{:?}", events.events());
    let outputs_json = serde_json::to_string(&result.outputs).unwrap();
    for secret in [api_key.expose(), storage_key.as_str()] {
        assert!(!state_json.contains(secret));
        assert!(!events_text.contains(secret));
        assert!(!outputs_json.contains(secret));
    }

    // the provider itself does receive the plaintext
    let body = fx.provider.body(&urn(ResourceKind::ContainerApp)).unwrap();
    assert_eq!(
        body["configuration"]["secrets"][0]["value"],
        api_key.expose()
    );
}

#[test]
fn events_follow_the_run() {
    let fx = Fixture::new();
    let events = Arc::new(RecordingEventSink::default());
    fx.use_case()
        .with_events(events.clone())
        .up(&fx.config)
        .unwrap();

    let events = events.events();
    assert!(matches!(
        events[0],
        DeployEvent::Started {
            command: "up",
            resource_count: 7,
            ..
        }
    ));
    assert!(matches!(events[1], DeployEvent::ConfigHashed { .. }));
    assert!(matches!(events[2], DeployEvent::Planned { creates: 7, .. }));
    let started = events
        .iter()
        .filter(|e| matches!(e, DeployEvent::StepStarted { .. }))
        .count();
    assert_eq!(started, 7);
    assert!(events.iter().any(|e| matches!(
        e,
        DeployEvent::Output { name, .. } if name == COLLECTOR_URL
    )));
    assert!(matches!(
        events.last(),
        Some(DeployEvent::Completed {
            changed: 7,
            unchanged: 0
        })
    ));
}

#[test]
fn outputs_come_from_saved_state() {
    let fx = Fixture::new();
    assert!(fx.use_case().outputs(&fx.config).unwrap().is_empty());

    fx.up();
    fx.reset_logs();

    let outputs = fx.use_case().outputs(&fx.config).unwrap();
    assert_eq!(
        outputs[COLLECTOR_URL],
        "https://collector.fake.azurecontainerapps.io"
    );
    assert!(fx.provider.reads().is_empty());
}

#[test]
fn prepared_run_exposes_plan_before_apply() {
    let fx = Fixture::new();
    let use_case = fx.use_case();

    let run = use_case.prepare_up(&fx.config).unwrap();
    assert_eq!(run.kind(), RunKind::Up);
    assert_eq!(run.plan().change_count(), 7);
    assert_eq!(run.digest(), Some(&ContentHash::from_bytes(b"X")));
    assert!(run.state().is_empty());

    // dropping the run applies nothing
    drop(run);
    assert!(fx.provider.calls().is_empty());
    assert_eq!(fx.state.save_count(), 0);
}

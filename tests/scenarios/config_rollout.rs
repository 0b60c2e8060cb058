//! First deploy, idempotent re-deploy, then a collector config change.

use crate::common::*;
use otelstack::domain::value_objects::ContentHash;

fn count(calls: &[String], prefix: &str) -> usize {
    calls.iter().filter(|c| c.starts_with(prefix)).count()
}

#[test]
fn first_up_creates_the_stack_in_order() {
    let env = TestEnv::new().with_fake_az();

    let result = env.run(&["up", "--yes"]);
    assert!(result.success, "{}", result.combined_output());

    let calls = env.az_calls();
    let order: Vec<&str> = calls
        .iter()
        .map(|c| {
            let words: Vec<&str> = c.split_whitespace().take(4).collect();
            match words.as_slice() {
                ["group", "create", ..] => "rg",
                ["storage", "account", "create", ..] => "sa",
                ["storage", "share-rm", "create", ..] => "share",
                ["storage", "file", "upload", ..] => "upload",
                ["containerapp", "env", "create", ..] => "env",
                ["containerapp", "env", "storage", "set"] => "env-storage",
                ["containerapp", "create", ..] => "app",
                _ => "other",
            }
        })
        .filter(|k| *k != "other")
        .collect();
    assert_eq!(
        order,
        vec!["rg", "sa", "share", "upload", "env", "env-storage", "app"]
    );

    let app_yaml = env.read("bin/app.log");
    assert!(app_yaml.contains("CONFIG_FILE_HASH"));
    assert!(app_yaml.contains(ContentHash::from_bytes(COLLECTOR_CONFIG_X.as_bytes()).hex()));
    assert!(app_yaml.contains("13133"));

    assert!(result.stdout.contains("collector-url"));
    assert!(env.project_path(".otelstack/ci.json").exists());
}

#[test]
fn second_up_with_same_config_calls_nothing() {
    let env = TestEnv::new().with_fake_az();
    assert!(env.run(&["up", "--yes"]).success);
    env.clear_az_log();

    let result = env.run(&["up", "--yes"]);

    assert!(result.success, "{}", result.combined_output());
    assert!(env.az_calls().is_empty(), "unexpected calls: {:?}", env.az_calls());
    assert!(result.stdout.contains("No changes"), "{}", result.stdout);
}

#[test]
fn up_from_another_directory_calls_nothing() {
    let env = TestEnv::new().with_fake_az();
    assert!(env.run(&["up", "--yes"]).success);
    env.clear_az_log();

    let stack_toml = env.project_path("otelstack.toml");
    let root = stack_toml.parent().unwrap();
    let relative = format!(
        "{}/otelstack.toml",
        root.file_name().unwrap().to_string_lossy()
    );

    let result = env.run_from(root.parent().unwrap(), &["--config", &relative, "up", "--yes"]);

    assert!(result.success, "{}", result.combined_output());
    assert!(env.az_calls().is_empty(), "unexpected calls: {:?}", env.az_calls());
    assert!(result.stdout.contains("No changes"), "{}", result.stdout);
}

#[test]
fn config_change_reuploads_and_updates_only_the_app() {
    let env = TestEnv::new().with_fake_az();
    assert!(env.run(&["up", "--yes"]).success);
    env.clear_az_log();
    env.write("config.yaml", COLLECTOR_CONFIG_Y);

    let preview = env.run(&["preview"]);
    assert!(preview.stdout.contains("changed since last upload"), "{}", preview.stdout);
    assert!(env.az_calls().is_empty());

    let result = env.run(&["up", "--yes"]);
    assert!(result.success, "{}", result.combined_output());

    let calls = env.az_calls();
    assert_eq!(count(&calls, "storage file upload"), 1);
    assert_eq!(count(&calls, "containerapp update"), 1);
    assert!(
        !calls.iter().any(|c| c.contains(" create ")),
        "nothing should be created: {:?}",
        calls
    );
    assert!(env
        .read("bin/app.log")
        .contains(ContentHash::from_bytes(COLLECTOR_CONFIG_Y.as_bytes()).hex()));
}

#[test]
fn secrets_stay_out_of_output_and_state() {
    let env = TestEnv::new().with_fake_az();
    let result = env.run(&["up", "--yes", "--diff", "-vv"]);
    assert!(result.success, "{}", result.combined_output());

    let state = env.read(".otelstack/ci.json");
    for secret in [TEST_API_KEY, FAKE_STORAGE_KEY] {
        assert!(!result.combined_output().contains(secret), "{} leaked to output", secret);
        assert!(!state.contains(secret), "{} leaked to state", secret);
    }
    // the api key only travels inside the app definition
    assert!(!env.az_calls().iter().any(|c| c.contains(TEST_API_KEY)));
}

#[test]
fn json_up_streams_events_then_result() {
    let env = TestEnv::new().with_fake_az();
    let result = env.run(&["up", "--yes", "--json"]);
    assert!(result.success, "{}", result.combined_output());

    let events: Vec<serde_json::Value> = result
        .stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    let names: Vec<&str> = events.iter().filter_map(|e| e["event"].as_str()).collect();
    assert_eq!(names.first(), Some(&"start"));
    assert_eq!(names.iter().filter(|n| **n == "step_done").count(), 7);
    assert!(names.contains(&"complete"));
    assert_eq!(names.last(), Some(&"result"));
    assert_eq!(
        events.last().unwrap()["outputs"]["collector-url"],
        "https://collector.happy.westeurope.azurecontainerapps.io"
    );
}

#[test]
fn outputs_after_up() {
    let env = TestEnv::new().with_fake_az();
    assert!(env.run(&["up", "--yes"]).success);

    let result = env.run(&["outputs"]);

    assert!(result.success, "{}", result.combined_output());
    assert!(result
        .stdout
        .contains("https://collector.happy.westeurope.azurecontainerapps.io"));
}

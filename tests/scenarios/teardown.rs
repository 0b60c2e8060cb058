//! Destroy after a deploy.

use crate::common::*;

#[test]
fn destroy_removes_dependents_first() {
    let env = TestEnv::new().with_fake_az();
    assert!(env.run(&["up", "--yes"]).success);
    env.clear_az_log();

    let result = env.run(&["destroy", "--yes"]);
    assert!(result.success, "{}", result.combined_output());

    let deletes: Vec<String> = env
        .az_calls()
        .into_iter()
        .filter(|c| c.contains(" delete ") || c.contains(" remove "))
        .map(|c| c.split(" --").next().unwrap_or_default().to_string())
        .collect();
    assert_eq!(
        deletes,
        vec![
            "containerapp delete",
            "containerapp env storage remove",
            "containerapp env delete",
            "storage share-rm delete",
            "storage account delete",
            "group delete",
        ]
    );

    let outputs = env.run(&["outputs"]);
    assert!(outputs.stdout.contains("No outputs"));
}

#[test]
fn destroy_needs_yes_when_not_interactive() {
    let env = TestEnv::new().with_fake_az();
    assert!(env.run(&["up", "--yes"]).success);
    env.clear_az_log();

    let result = env.run(&["destroy"]);

    assert!(!result.success);
    assert!(result.stderr.contains("--yes"), "{}", result.stderr);
    assert!(env.az_calls().is_empty());
}

#[test]
fn failed_az_call_stops_the_run_and_resumes() {
    let env = TestEnv::new().with_fake_az();
    // a broken environment step: everything after it must wait
    let script = env.read("bin/az").replace(
        "case \"$1 $2 $3 $4\" in",
        "if [ -f \"$dir/fail-env\" ] && [ \"$1 $2 $3\" = \"containerapp env create\" ]; then echo 'quota exceeded' >&2; exit 1; fi\ncase \"$1 $2 $3 $4\" in",
    );
    env.write("bin/az", &script);
    env.write("bin/fail-env", "");

    let failed = env.run(&["up", "--yes"]);
    assert!(!failed.success);
    assert!(failed.stderr.contains("quota exceeded"), "{}", failed.stderr);
    assert!(!env.az_calls().iter().any(|c| c.starts_with("containerapp create")));

    std::fs::remove_file(env.project_path("bin/fail-env")).unwrap();
    env.clear_az_log();
    let retry = env.run(&["up", "--yes"]);
    assert!(retry.success, "{}", retry.combined_output());
    let calls = env.az_calls();
    assert!(!calls.iter().any(|c| c.starts_with("group create")));
    assert!(calls.iter().any(|c| c.starts_with("containerapp env create")));
    assert!(calls.iter().any(|c| c.starts_with("containerapp create")));
}

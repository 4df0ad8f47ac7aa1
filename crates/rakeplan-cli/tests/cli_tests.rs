use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper function to create a temporary directory for CLI tests
fn create_cli_test_environment() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Helper function to create a Command with --no-color flag for testing
fn rakeplan_cmd(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("rakeplan").expect("Failed to find rakeplan binary");
    cmd.arg("--no-color")
        .arg("--database-file")
        .arg(temp_dir.path().join("cli_test.db"));
    cmd
}

#[test]
fn test_cli_help_lists_commands() {
    Command::cargo_bin("rakeplan")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("submit"))
        .stdout(predicate::str::contains("audit"));
}

#[test]
fn test_cli_show_missing_plan_fails() {
    let temp_dir = create_cli_test_environment();

    rakeplan_cmd(&temp_dir)
        .args(["plan", "show", "2025-10-05"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No plan found for 2025-10-05"));
}

#[test]
fn test_cli_rejects_malformed_date() {
    let temp_dir = create_cli_test_environment();

    rakeplan_cmd(&temp_dir)
        .args(["plan", "show", "05/10/2025"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_cli_lock_missing_plan_fails() {
    let temp_dir = create_cli_test_environment();

    rakeplan_cmd(&temp_dir)
        .args(["plan", "lock", "2025-10-05"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to lock plan"));
}

#[test]
fn test_cli_empty_audit_log() {
    let temp_dir = create_cli_test_environment();

    rakeplan_cmd(&temp_dir)
        .args(["audit", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No audit entries recorded."));
}

#[test]
fn test_cli_audit_add_then_list() {
    let temp_dir = create_cli_test_environment();

    rakeplan_cmd(&temp_dir)
        .args([
            "audit",
            "add",
            "--reason",
            "siding under maintenance",
            "--user",
            "ops",
            "--change",
            r#"{"row_id": 2}"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("siding under maintenance"));

    rakeplan_cmd(&temp_dir)
        .args(["audit", "ls"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ops"))
        .stdout(predicate::str::contains("\"row_id\": 2"));
}

#[test]
fn test_cli_audit_add_requires_reason() {
    let temp_dir = create_cli_test_environment();

    rakeplan_cmd(&temp_dir)
        .args(["audit", "add", "--reason", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reason"));
}

#[test]
fn test_cli_audit_add_rejects_bad_json() {
    let temp_dir = create_cli_test_environment();

    rakeplan_cmd(&temp_dir)
        .args(["audit", "add", "--reason", "manual", "--change", "{oops"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --change JSON"));
}

#[test]
fn test_cli_unknown_job_fails() {
    let temp_dir = create_cli_test_environment();

    rakeplan_cmd(&temp_dir)
        .args(["job", "show", "no-such-job"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Job no-such-job not found"));

    rakeplan_cmd(&temp_dir)
        .args(["job", "cancel", "no-such-job"])
        .assert()
        .failure();
}

#[test]
fn test_cli_submit_without_server_fails() {
    let temp_dir = create_cli_test_environment();

    rakeplan_cmd(&temp_dir)
        .args(["submit", "--server", "http://127.0.0.1:1", "--quick"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to reach http://127.0.0.1:1"));
}

#[test]
fn test_cli_serve_rejects_zero_workers() {
    let temp_dir = create_cli_test_environment();

    rakeplan_cmd(&temp_dir)
        .args(["serve", "--workers", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid server configuration"));
}

//! Integration tests for the sprinter CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// A sprinter command isolated from the caller's environment
fn sprinter(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("sprinter").unwrap();
    cmd.current_dir(tmp.path())
        .env_remove("SPRINTER_USER")
        .env_remove("SPRINTER_DB")
        .env_remove("SPRINTER_LOG")
        .env("XDG_CONFIG_HOME", tmp.path().join("xdg"));
    cmd
}

/// Workspace with `alice` as administrator and default user
fn setup_workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    sprinter(&tmp)
        .args(["init", "--admin", "alice", "--name", "Alice"])
        .assert()
        .success();
    tmp
}

/// Workspace with project APP, managed by alice, and a plain user bob
fn setup_project() -> TempDir {
    let tmp = setup_workspace();
    sprinter(&tmp).args(["user", "add", "bob"]).assert().success();
    sprinter(&tmp)
        .args(["project", "new", "Mobile App", "--key", "APP"])
        .assert()
        .success();
    tmp
}

fn create_item(tmp: &TempDir, title: &str) {
    sprinter(tmp)
        .args(["item", "new", "APP", title])
        .assert()
        .success();
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    sprinter(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sprint"));
}

#[test]
fn test_unknown_command_fails() {
    let tmp = TempDir::new().unwrap();
    sprinter(&tmp)
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_command_outside_workspace_fails() {
    let tmp = TempDir::new().unwrap();
    sprinter(&tmp)
        .args(["project", "list", "--as", "alice"])
        .assert()
        .failure();
}

// ============================================================================
// Init Command Tests
// ============================================================================

#[test]
fn test_init_creates_workspace() {
    let tmp = TempDir::new().unwrap();

    sprinter(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));

    assert!(tmp.path().join(".sprinter").is_dir());
    assert!(tmp.path().join(".sprinter/config.yaml").exists());
}

#[test]
fn test_init_twice_warns() {
    let tmp = setup_workspace();

    sprinter(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_init_admin_becomes_default_user() {
    let tmp = setup_workspace();

    let config = fs::read_to_string(tmp.path().join(".sprinter/config.yaml")).unwrap();
    assert!(config.contains("user: alice"));

    sprinter(&tmp)
        .args(["user", "whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alice"))
        .stdout(predicate::str::contains("admin"));
}

// ============================================================================
// User Command Tests
// ============================================================================

#[test]
fn test_first_user_add_bootstraps_admin() {
    let tmp = TempDir::new().unwrap();
    sprinter(&tmp).arg("init").assert().success();

    sprinter(&tmp)
        .args(["user", "add", "root"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created admin root"));
}

#[test]
fn test_non_admin_cannot_add_users() {
    let tmp = setup_project();

    sprinter(&tmp)
        .args(["--as", "bob", "user", "add", "mallory"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Access denied"));
}

#[test]
fn test_no_acting_user_is_reported() {
    let tmp = TempDir::new().unwrap();
    sprinter(&tmp).arg("init").assert().success();
    sprinter(&tmp).args(["user", "add", "root"]).assert().success();

    sprinter(&tmp)
        .args(["project", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no acting user"));
}

#[test]
fn test_env_user_overrides_config() {
    let tmp = setup_project();

    sprinter(&tmp)
        .env("SPRINTER_USER", "bob")
        .args(["user", "whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bob"));
}

// ============================================================================
// Project Command Tests
// ============================================================================

#[test]
fn test_project_new_suggests_key() {
    let tmp = setup_workspace();

    sprinter(&tmp)
        .args(["project", "new", "Web Portal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created project WP"));
}

#[test]
fn test_project_new_rejects_bad_key() {
    let tmp = setup_workspace();

    sprinter(&tmp)
        .args(["project", "new", "Oops", "--key", "1BAD"])
        .assert()
        .failure();
}

#[test]
fn test_project_list_hides_foreign_projects() {
    let tmp = setup_project();

    sprinter(&tmp)
        .args(["project", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("APP"));

    sprinter(&tmp)
        .args(["--as", "bob", "project", "list", "--format", "id"])
        .assert()
        .success()
        .stdout(predicate::str::contains("APP").not());
}

#[test]
fn test_subproject_inherits_roles() {
    let tmp = setup_project();
    sprinter(&tmp)
        .args(["member", "add", "APP", "bob", "--role", "observer"])
        .assert()
        .success();
    sprinter(&tmp)
        .args(["project", "sub", "APP", "Backend", "--key", "API"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created subproject API under APP"));

    sprinter(&tmp)
        .args(["project", "role", "API", "--user", "bob"])
        .assert()
        .success()
        .stdout(predicate::str::contains("observer"));
}

#[test]
fn test_project_show_names_parent() {
    let tmp = setup_project();
    sprinter(&tmp)
        .args(["project", "sub", "APP", "Backend", "--key", "API"])
        .assert()
        .success();

    sprinter(&tmp)
        .args(["project", "show", "API"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"parent:\s+APP").unwrap());
    sprinter(&tmp)
        .args(["project", "show", "APP"])
        .assert()
        .success()
        .stdout(predicate::str::contains("parent:").not());
}

// ============================================================================
// Member Command Tests
// ============================================================================

#[test]
fn test_member_add_and_list() {
    let tmp = setup_project();

    sprinter(&tmp)
        .args(["member", "add", "APP", "bob"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bob is now team_member of APP"));

    sprinter(&tmp)
        .args(["member", "list", "APP"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alice"))
        .stdout(predicate::str::contains("bob"));
}

#[test]
fn test_last_manager_cannot_leave() {
    let tmp = setup_project();

    sprinter(&tmp)
        .args(["member", "remove", "APP", "alice"])
        .assert()
        .failure();
}

// ============================================================================
// Work Item Command Tests
// ============================================================================

#[test]
fn test_item_keys_are_sequential() {
    let tmp = setup_project();

    sprinter(&tmp)
        .args(["item", "new", "APP", "First"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created APP-1"));
    sprinter(&tmp)
        .args(["item", "new", "APP", "Second", "--type", "bug"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created APP-2"));

    sprinter(&tmp)
        .args(["item", "list", "APP"])
        .assert()
        .success()
        .stdout(predicate::str::contains("APP-1"))
        .stdout(predicate::str::contains("APP-2"));
}

#[test]
fn test_item_list_json() {
    let tmp = setup_project();
    create_item(&tmp, "First");
    create_item(&tmp, "Second");

    let output = sprinter(&tmp)
        .args(["item", "list", "APP", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let items: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let items = items.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["item_number"], 1);
    assert_eq!(items[0]["status"], "to_do");
    assert_eq!(items[1]["project_key"], "APP");
}

#[test]
fn test_item_status_change() {
    let tmp = setup_project();
    create_item(&tmp, "Fix login");

    sprinter(&tmp)
        .args(["item", "status", "APP-1", "in-progress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("APP-1 is now in_progress"));

    sprinter(&tmp)
        .args(["item", "list", "APP", "--status", "in-progress", "--format", "id"])
        .assert()
        .success()
        .stdout(predicate::str::contains("APP-1"));
}

#[test]
fn test_item_show_with_comment() {
    let tmp = setup_project();
    create_item(&tmp, "Fix login");
    sprinter(&tmp)
        .args(["comment", "add", "APP-1", "Reproduced on Android"])
        .assert()
        .success();

    sprinter(&tmp)
        .args(["item", "show", "APP-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fix login"))
        .stdout(predicate::str::contains("Reproduced on Android"));
}

#[test]
fn test_non_member_cannot_create_items() {
    let tmp = setup_project();

    sprinter(&tmp)
        .args(["--as", "bob", "item", "new", "APP", "Sneaky"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Access denied"));
}

#[test]
fn test_observer_can_comment_but_not_edit() {
    let tmp = setup_project();
    create_item(&tmp, "Fix login");
    sprinter(&tmp)
        .args(["member", "add", "APP", "bob", "--role", "observer"])
        .assert()
        .success();

    sprinter(&tmp)
        .args(["--as", "bob", "comment", "add", "APP-1", "Looks bad"])
        .assert()
        .success();
    sprinter(&tmp)
        .args(["--as", "bob", "item", "status", "APP-1", "done"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Access denied"));
}

#[test]
fn test_dependency_between_items() {
    let tmp = setup_project();
    create_item(&tmp, "Design");
    create_item(&tmp, "Build");

    sprinter(&tmp)
        .args(["dep", "add", "APP-1", "APP-2", "--type", "fs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Linked APP-1 -> APP-2"));

    sprinter(&tmp)
        .args(["dep", "add", "APP-2", "APP-2"])
        .assert()
        .failure();
}

#[test]
fn test_item_progress_and_hours() {
    let tmp = setup_project();
    sprinter(&tmp)
        .args(["item", "new", "APP", "Migrate", "--estimate", "6", "--due", "2025-07-01"])
        .assert()
        .success();

    sprinter(&tmp)
        .args(["item", "progress", "APP-1", "140"])
        .assert()
        .success()
        .stdout(predicate::str::contains("100% done"));
    sprinter(&tmp)
        .args(["item", "log", "APP-1", "1.5"])
        .assert()
        .success();
    sprinter(&tmp)
        .args(["item", "log", "APP-1", "-2"])
        .assert()
        .failure();

    sprinter(&tmp)
        .args(["item", "show", "APP-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("progress:  100%"))
        .stdout(predicate::str::contains("hours:     1.5 of 6"))
        .stdout(predicate::str::contains("2025-07-01"));
}

#[test]
fn test_labels_on_items() {
    let tmp = setup_project();
    sprinter(&tmp)
        .args(["label", "new", "backend", "--project", "APP"])
        .assert()
        .success();
    sprinter(&tmp)
        .args(["label", "new", "urgent", "--color", "#FF0000"])
        .assert()
        .success();
    sprinter(&tmp)
        .args(["item", "new", "APP", "Cache", "--label", "backend"])
        .assert()
        .success();
    sprinter(&tmp)
        .args(["label", "attach", "APP-1", "URGENT"])
        .assert()
        .success();

    sprinter(&tmp)
        .args(["item", "show", "APP-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("labels:    backend, urgent"));

    sprinter(&tmp)
        .args(["label", "list", "APP", "--format", "tsv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("global"));

    sprinter(&tmp)
        .args(["label", "detach", "APP-1", "backend"])
        .assert()
        .success();
    sprinter(&tmp)
        .args(["label", "attach", "APP-1", "missing"])
        .assert()
        .failure();
}

#[test]
fn test_item_mine_lists_assigned_work() {
    let tmp = setup_project();
    sprinter(&tmp)
        .args(["member", "add", "APP", "bob", "--role", "team-member"])
        .assert()
        .success();
    sprinter(&tmp)
        .args(["item", "new", "APP", "Later", "-a", "bob", "--due", "2025-09-01"])
        .assert()
        .success();
    sprinter(&tmp)
        .args(["item", "new", "APP", "Sooner", "-a", "bob", "--due", "2025-08-01"])
        .assert()
        .success();
    create_item(&tmp, "Nobody's");

    let output = sprinter(&tmp)
        .args(["--as", "bob", "item", "mine", "--format", "id"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let keys: Vec<&str> = stdout.lines().collect();
    assert_eq!(keys, vec!["APP-2", "APP-1"]);
}

// ============================================================================
// Sprint Command Tests
// ============================================================================

#[test]
fn test_sprint_lifecycle() {
    let tmp = setup_project();
    create_item(&tmp, "Done soon");
    create_item(&tmp, "Left over");

    sprinter(&tmp)
        .args(["sprint", "new", "APP", "Sprint 1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Planned sprint #1"));
    sprinter(&tmp).args(["sprint", "add", "1", "APP-1"]).assert().success();
    sprinter(&tmp).args(["sprint", "add", "1", "APP-2"]).assert().success();
    sprinter(&tmp).args(["sprint", "start", "1"]).assert().success();
    sprinter(&tmp)
        .args(["item", "status", "APP-1", "done"])
        .assert()
        .success();

    sprinter(&tmp)
        .args(["sprint", "complete", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("moved 1 unfinished item(s) to the backlog"));

    sprinter(&tmp)
        .args(["item", "list", "APP", "--backlog", "--format", "id"])
        .assert()
        .success()
        .stdout(predicate::str::contains("APP-2"))
        .stdout(predicate::str::contains("APP-1").not());
}

#[test]
fn test_only_one_active_sprint() {
    let tmp = setup_project();
    sprinter(&tmp).args(["sprint", "new", "APP", "One"]).assert().success();
    sprinter(&tmp).args(["sprint", "new", "APP", "Two"]).assert().success();
    sprinter(&tmp).args(["sprint", "start", "1"]).assert().success();

    sprinter(&tmp)
        .args(["sprint", "start", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("active sprint"));
}

#[test]
fn test_epics_stay_out_of_sprints() {
    let tmp = setup_project();
    sprinter(&tmp)
        .args(["item", "new", "APP", "Big theme", "--type", "epic"])
        .assert()
        .success();
    sprinter(&tmp).args(["sprint", "new", "APP", "One"]).assert().success();

    sprinter(&tmp)
        .args(["sprint", "add", "1", "APP-1"])
        .assert()
        .failure();
}

// ============================================================================
// Report Command Tests
// ============================================================================

#[test]
fn test_project_report() {
    let tmp = setup_project();
    create_item(&tmp, "One");
    create_item(&tmp, "Two");
    sprinter(&tmp)
        .args(["item", "status", "APP-1", "done"])
        .assert()
        .success();

    sprinter(&tmp)
        .args(["report", "project", "APP"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Completion: 50%"))
        .stdout(predicate::str::contains("in_review"));
}

#[test]
fn test_sprint_report_to_file() {
    let tmp = setup_project();
    create_item(&tmp, "One");
    sprinter(&tmp).args(["sprint", "new", "APP", "One"]).assert().success();
    sprinter(&tmp).args(["sprint", "add", "1", "APP-1"]).assert().success();

    let path = tmp.path().join("sprint.md");
    sprinter(&tmp)
        .args(["report", "sprint", "1", "-o", path.to_str().unwrap()])
        .assert()
        .success();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("# Sprint One"));
    assert!(content.contains("APP-1"));
}

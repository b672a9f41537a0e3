//! Integration tests for the sitedesk CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get a sitedesk command with a deterministic acting user
fn sitedesk() -> Command {
    let mut cmd = Command::cargo_bin("sitedesk").unwrap();
    cmd.env("SITEDESK_USER", "test-user");
    cmd.env_remove("SITEDESK_PROJECT");
    cmd
}

/// Helper to get a command running inside the given workspace
fn cmd(tmp: &TempDir) -> Command {
    let mut c = sitedesk();
    c.current_dir(tmp.path());
    c
}

/// Helper to create a workspace on the local JSON backend
fn setup_workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    cmd(&tmp).arg("init").assert().success();
    tmp
}

/// Helper to create a workspace on the SQLite backend
fn setup_sqlite_workspace() -> TempDir {
    let tmp = TempDir::new().unwrap();
    cmd(&tmp)
        .args(["init", "--storage", "sqlite"])
        .assert()
        .success();
    tmp
}

/// Helper to create a project in the workspace
fn setup_project(tmp: &TempDir, name: &str) {
    cmd(tmp)
        .args(["project", "new", name])
        .assert()
        .success();
}

/// Capture stdout of a successful command
fn stdout_of(mut command: Command) -> String {
    let output = command.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    sitedesk()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Construction project records"));
}

#[test]
fn test_version_displays() {
    sitedesk()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sitedesk"));
}

#[test]
fn test_unknown_command_fails() {
    sitedesk()
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_command_outside_workspace_fails() {
    let tmp = TempDir::new().unwrap();
    cmd(&tmp)
        .args(["project", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a sitedesk workspace"));
}

// ============================================================================
// Init Command Tests
// ============================================================================

#[test]
fn test_init_creates_workspace_structure() {
    let tmp = TempDir::new().unwrap();

    cmd(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));

    assert!(tmp.path().join(".sitedesk").is_dir());
    assert!(tmp.path().join(".sitedesk/config.yml").exists());
    assert!(tmp.path().join(".sitedesk/data").is_dir());
    assert!(tmp.path().join(".sitedesk/files").is_dir());
}

#[test]
fn test_init_twice_warns_but_succeeds() {
    let tmp = setup_workspace();
    cmd(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_init_rejects_unknown_storage() {
    let tmp = TempDir::new().unwrap();
    cmd(&tmp)
        .args(["init", "--storage", "postgres"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid storage"));
}

#[test]
fn test_init_sqlite_backend() {
    let tmp = setup_sqlite_workspace();
    setup_project(&tmp, "Tower A");

    assert!(tmp.path().join(".sitedesk/sitedesk.db").exists());
    cmd(&tmp)
        .args(["project", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tower A"));
}

#[test]
fn test_discovery_from_subdirectory() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    let sub = tmp.path().join("reports/q3");
    fs::create_dir_all(&sub).unwrap();

    let mut c = sitedesk();
    c.current_dir(&sub);
    c.args(["project", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tower A"));
}

// ============================================================================
// Project Command Tests
// ============================================================================

#[test]
fn test_project_new_makes_creator_admin() {
    let tmp = setup_workspace();
    cmd(&tmp)
        .args(["project", "new", "Tower A", "--city", "Des Moines"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created project"))
        .stdout(predicate::str::contains("administrator"));

    cmd(&tmp)
        .args(["member", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("test-user"))
        .stdout(predicate::str::contains("administrator"));
}

#[test]
fn test_project_new_requires_name() {
    let tmp = setup_workspace();
    cmd(&tmp)
        .args(["project", "new", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_project_new_rejects_negative_value() {
    let tmp = setup_workspace();
    cmd(&tmp)
        .args(["project", "new", "Tower A", "--value=-5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("negative"));
}

#[test]
fn test_project_list_empty() {
    let tmp = setup_workspace();
    cmd(&tmp)
        .args(["project", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No projects found."));
}

#[test]
fn test_project_show_json() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");

    let out = stdout_of({
        let mut c = cmd(&tmp);
        c.args(["project", "show", "Tower A", "-f", "json"]);
        c
    });
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["name"], "Tower A");
    assert_eq!(value["stage"], "bidding");
}

#[test]
fn test_project_edit() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");

    cmd(&tmp)
        .args([
            "project",
            "edit",
            "--stage",
            "course of construction",
            "--city",
            "Cedar Rapids",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated project"));

    cmd(&tmp)
        .args(["project", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("course of construction"))
        .stdout(predicate::str::contains("Cedar Rapids"));
}

#[test]
fn test_project_edit_without_fields_fails() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    cmd(&tmp)
        .args(["project", "edit"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to update"));
}

#[test]
fn test_project_delete_cascades() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    setup_project(&tmp, "Warehouse");

    cmd(&tmp)
        .args(["-p", "Tower A", "task", "new", "Pour footings"])
        .assert()
        .success();
    cmd(&tmp)
        .args(["-p", "Tower A", "doc", "mkdir", "Drawings"])
        .assert()
        .success();
    cmd(&tmp)
        .args(["-p", "Warehouse", "task", "new", "Grade the lot"])
        .assert()
        .success();

    cmd(&tmp)
        .args(["project", "delete", "Tower A", "-y"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted project"));

    cmd(&tmp)
        .args(["project", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Warehouse"))
        .stdout(predicate::str::contains("Tower A").not());

    // the survivor keeps its records
    cmd(&tmp)
        .args(["-p", "Warehouse", "task", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Grade the lot"));
}

#[test]
fn test_project_selection_by_flag_and_prefix() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    setup_project(&tmp, "Warehouse");

    // two projects, no selection
    cmd(&tmp)
        .args(["task", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No project selected"));

    // unique prefix works
    cmd(&tmp)
        .args(["-p", "Ware", "task", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks found."));
}

// ============================================================================
// Member Command Tests
// ============================================================================

#[test]
fn test_member_add_and_upsert_role() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");

    cmd(&tmp)
        .args(["member", "add", "u-pm"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added u-pm as member"));

    // same pair again updates the role instead of duplicating
    cmd(&tmp)
        .args(["member", "add", "u-pm", "--admin"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Changed role of u-pm"));

    let out = stdout_of({
        let mut c = cmd(&tmp);
        c.args(["member", "list"]);
        c
    });
    assert_eq!(out.matches("u-pm").count(), 1);
    assert!(out.contains("2 member(s)"));
}

#[test]
fn test_member_remove() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    cmd(&tmp).args(["member", "add", "u-pm"]).assert().success();

    cmd(&tmp)
        .args(["member", "remove", "u-pm"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed u-pm"));

    cmd(&tmp)
        .args(["member", "remove", "u-pm"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

// ============================================================================
// Directory Command Tests
// ============================================================================

#[test]
fn test_contact_add_list_remove() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");

    cmd(&tmp)
        .args([
            "contact",
            "add",
            "dana@arch.example",
            "--first",
            "Dana",
            "--last",
            "Architect",
            "--permission",
            "architect/engineer",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dana Architect"));

    cmd(&tmp)
        .args(["contact", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dana@arch.example"))
        .stdout(predicate::str::contains("architect/engineer"));

    cmd(&tmp)
        .args(["contact", "remove", "dana@arch.example"])
        .assert()
        .success();
    cmd(&tmp)
        .args(["contact", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No contacts found."));
}

#[test]
fn test_contact_add_requires_email() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    cmd(&tmp)
        .args(["contact", "add", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_contact_import_csv() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    fs::write(
        tmp.path().join("contacts.csv"),
        "first_name,last_name,email,permission\n\
         Dana,Architect,dana@arch.example,architect/engineer\n\
         Lee,Owner,lee@owner.example,owner/client\n",
    )
    .unwrap();

    cmd(&tmp)
        .args(["contact", "import", "contacts.csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 contact(s)"));

    cmd(&tmp)
        .args(["contact", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dana Architect"))
        .stdout(predicate::str::contains("lee@owner.example"));
}

#[test]
fn test_contact_import_skip_errors() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    fs::write(
        tmp.path().join("contacts.csv"),
        "first_name,last_name,email,permission\n\
         Dana,Architect,dana@arch.example,architect/engineer\n\
         Bad,Row,,company employee\n\
         Lee,Owner,lee@owner.example,owner/client\n",
    )
    .unwrap();

    cmd(&tmp)
        .args(["contact", "import", "contacts.csv", "--skip-errors"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 contact(s)"))
        .stdout(predicate::str::contains("skipped 1 row(s)"));
}

#[test]
fn test_contact_import_without_email_column_fails() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    fs::write(
        tmp.path().join("contacts.csv"),
        "first_name,last_name\nDana,Architect\n",
    )
    .unwrap();

    cmd(&tmp)
        .args(["contact", "import", "contacts.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("email"));
}

#[test]
fn test_company_add_and_list() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");

    cmd(&tmp)
        .args([
            "company",
            "add",
            "Eastside Electric",
            "--type",
            "electrical",
            "--phone",
            "555-0100",
        ])
        .assert()
        .success();

    cmd(&tmp)
        .args(["company", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Eastside Electric"))
        .stdout(predicate::str::contains("electrical"));
}

#[test]
fn test_group_add_show() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    cmd(&tmp)
        .args(["contact", "add", "dana@arch.example", "--first", "Dana"])
        .assert()
        .success();

    cmd(&tmp)
        .args(["group", "add", "Design Team", "-m", "dana@arch.example"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 member(s)"));

    cmd(&tmp)
        .args(["group", "show", "Design Team"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dana@arch.example"));
}

#[test]
fn test_group_keeps_dangling_members() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    cmd(&tmp)
        .args(["contact", "add", "dana@arch.example", "--first", "Dana"])
        .assert()
        .success();
    cmd(&tmp)
        .args(["group", "add", "Design Team", "-m", "dana@arch.example"])
        .assert()
        .success();
    cmd(&tmp)
        .args(["contact", "remove", "dana@arch.example"])
        .assert()
        .success();

    // the stale reference renders as a placeholder, not an error
    cmd(&tmp)
        .args(["group", "show", "Design Team"])
        .assert()
        .success()
        .stdout(predicate::str::contains("—"));
}

// ============================================================================
// Document Tree Tests
// ============================================================================

#[test]
fn test_doc_mkdir_and_tree() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");

    cmd(&tmp)
        .args(["doc", "mkdir", "Drawings"])
        .assert()
        .success();
    cmd(&tmp)
        .args(["doc", "mkdir", "Architectural", "--in", "Drawings"])
        .assert()
        .success();

    cmd(&tmp)
        .args(["doc", "tree"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Drawings"))
        .stdout(predicate::str::contains("Architectural"));
}

#[test]
fn test_doc_add_and_export_file() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    fs::write(tmp.path().join("note.txt"), "pour schedule rev 2").unwrap();

    cmd(&tmp)
        .args(["doc", "add", "note.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added file"));

    cmd(&tmp)
        .args(["doc", "export", "note.txt", "out.txt"])
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(tmp.path().join("out.txt")).unwrap(),
        "pour schedule rev 2"
    );
}

#[test]
fn test_doc_export_folder_fails() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    cmd(&tmp)
        .args(["doc", "mkdir", "Drawings"])
        .assert()
        .success();

    cmd(&tmp)
        .args(["doc", "export", "Drawings"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("folder"));
}

#[test]
fn test_doc_path_breadcrumb() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    cmd(&tmp)
        .args(["doc", "mkdir", "Drawings"])
        .assert()
        .success();
    cmd(&tmp)
        .args(["doc", "mkdir", "Architectural", "--in", "Drawings"])
        .assert()
        .success();

    cmd(&tmp)
        .args(["doc", "path", "Drawings/Architectural"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Drawings / Architectural"));
}

#[test]
fn test_doc_recursive_delete() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    cmd(&tmp)
        .args(["doc", "mkdir", "Drawings"])
        .assert()
        .success();
    cmd(&tmp)
        .args(["doc", "mkdir", "Architectural", "--in", "Drawings"])
        .assert()
        .success();
    fs::write(tmp.path().join("plan.txt"), "A-101").unwrap();
    cmd(&tmp)
        .args(["doc", "add", "plan.txt", "--in", "Drawings/Architectural"])
        .assert()
        .success();

    cmd(&tmp)
        .args(["doc", "delete", "Drawings", "-y"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 node(s)"));

    cmd(&tmp)
        .args(["doc", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No documents found."));
}

#[test]
fn test_doc_copy_appends_suffix_and_clones_children() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    cmd(&tmp)
        .args(["doc", "mkdir", "Structural"])
        .assert()
        .success();
    cmd(&tmp)
        .args(["doc", "mkdir", "Calcs", "--in", "Structural"])
        .assert()
        .success();

    cmd(&tmp)
        .args(["doc", "copy", "Structural", "--root"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Copied 2 node(s)"))
        .stdout(predicate::str::contains("Structural (copy)"));

    // the clone has its own child; the original is untouched
    cmd(&tmp)
        .args(["doc", "path", "Structural (copy)/Calcs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Structural (copy) / Calcs"));
    cmd(&tmp)
        .args(["doc", "path", "Structural/Calcs"])
        .assert()
        .success();
}

#[test]
fn test_doc_move_rejects_own_subtree() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    cmd(&tmp).args(["doc", "mkdir", "A"]).assert().success();
    cmd(&tmp)
        .args(["doc", "mkdir", "B", "--in", "A"])
        .assert()
        .success();

    cmd(&tmp)
        .args(["doc", "move", "A", "--to", "A/B"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("its own subtree"));
}

#[test]
fn test_doc_move_to_root_and_back() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    cmd(&tmp).args(["doc", "mkdir", "A"]).assert().success();
    cmd(&tmp)
        .args(["doc", "mkdir", "B", "--in", "A"])
        .assert()
        .success();

    cmd(&tmp)
        .args(["doc", "move", "A/B", "--root"])
        .assert()
        .success();
    cmd(&tmp)
        .args(["doc", "path", "B"])
        .assert()
        .success()
        .stdout(predicate::str::diff("B\n"));

    cmd(&tmp)
        .args(["doc", "move", "B", "--to", "A"])
        .assert()
        .success();
    cmd(&tmp)
        .args(["doc", "path", "A/B"])
        .assert()
        .success()
        .stdout(predicate::str::contains("A / B"));
}

#[test]
fn test_doc_file_cannot_contain_children() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    fs::write(tmp.path().join("note.txt"), "x").unwrap();
    cmd(&tmp).args(["doc", "add", "note.txt"]).assert().success();

    cmd(&tmp)
        .args(["doc", "mkdir", "Sub", "--in", "note.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a folder"));
}

// ============================================================================
// Task Command Tests
// ============================================================================

#[test]
fn test_task_numbering_starts_at_one() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    cmd(&tmp)
        .args(["task", "new", "Pour footings"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#1"));
    cmd(&tmp)
        .args(["task", "new", "Strip forms"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#2"));
}

#[test]
fn test_task_close_and_filter() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    cmd(&tmp)
        .args(["task", "new", "Pour footings"])
        .assert()
        .success();
    cmd(&tmp).args(["task", "close", "1"]).assert().success();

    cmd(&tmp)
        .args(["task", "list", "--status", "closed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pour footings"));
    cmd(&tmp)
        .args(["task", "list", "--status", "open"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks found."));
}

#[test]
fn test_task_attachment_staged_in_file_store() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    fs::write(tmp.path().join("photo.txt"), "slab crack, east bay").unwrap();

    cmd(&tmp)
        .args(["task", "new", "Review crack", "--attach", "photo.txt"])
        .assert()
        .success();

    let out = stdout_of({
        let mut c = cmd(&tmp);
        c.args(["task", "show", "1", "-f", "json"]);
        c
    });
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["attachments"][0]["name"], "photo.txt");

    let digest = value["attachments"][0]["digest"].as_str().unwrap();
    assert!(tmp.path().join(".sitedesk/files").join(digest).is_file());
}

#[test]
fn test_task_delete_not_journaled() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    cmd(&tmp)
        .args(["task", "new", "Pour footings"])
        .assert()
        .success();

    cmd(&tmp)
        .args(["task", "delete", "1", "-y"])
        .assert()
        .success();

    let out = stdout_of({
        let mut c = cmd(&tmp);
        c.args(["activity"]);
        c
    });
    assert!(out.contains("Task #1: Pour footings"));
    assert!(!out.contains("deleted"));
}

// ============================================================================
// RFI Command Tests
// ============================================================================

#[test]
fn test_rfi_numbers_skip_gaps() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");

    cmd(&tmp)
        .args(["rfi", "new", "Footing depth at grid 3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#1"));
    cmd(&tmp)
        .args(["rfi", "new", "Window head detail"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#2"));

    cmd(&tmp)
        .args(["rfi", "delete", "2", "-y"])
        .assert()
        .success();

    // the freed number is never reissued
    cmd(&tmp)
        .args(["rfi", "new", "Roof drain overflow"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#3"));
}

#[test]
fn test_rfi_numbering_is_per_project() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    setup_project(&tmp, "Warehouse");

    cmd(&tmp)
        .args(["-p", "Tower A", "rfi", "new", "Footing depth"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#1"));
    cmd(&tmp)
        .args(["-p", "Warehouse", "rfi", "new", "Dock leveler spec"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#1"));
}

#[test]
fn test_rfi_explicit_number_advances_sequence() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");

    cmd(&tmp)
        .args(["rfi", "new", "Imported question", "--number", "40"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#40"));
    cmd(&tmp)
        .args(["rfi", "new", "Next question"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#41"));
}

#[test]
fn test_rfi_subject_length_cap() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    let long_subject = "x".repeat(201);

    cmd(&tmp)
        .args(["rfi", "new", &long_subject])
        .assert()
        .failure()
        .stderr(predicate::str::contains("200"));

    let ok_subject = "x".repeat(200);
    cmd(&tmp)
        .args(["rfi", "new", &ok_subject])
        .assert()
        .success();
}

#[test]
fn test_rfi_respond_appends_thread() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    cmd(&tmp)
        .args(["rfi", "new", "Window head detail"])
        .assert()
        .success();

    cmd(&tmp)
        .args(["rfi", "respond", "1", "See sketch SK-12."])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 total"));
    cmd(&tmp)
        .args(["rfi", "respond", "1", "Confirmed on site."])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 total"));

    cmd(&tmp)
        .args(["rfi", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("See sketch SK-12."))
        .stdout(predicate::str::contains("Confirmed on site."));

    cmd(&tmp)
        .args(["activity"])
        .assert()
        .success()
        .stdout(predicate::str::contains("RFI #1 received a response"));
}

#[test]
fn test_rfi_show_lists_attachments() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    fs::write(tmp.path().join("sk-12.txt"), "revised head detail").unwrap();

    cmd(&tmp)
        .args([
            "rfi",
            "new",
            "Window head detail",
            "--attach",
            "sk-12.txt",
        ])
        .assert()
        .success();

    cmd(&tmp)
        .args(["rfi", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Attachments"))
        .stdout(predicate::str::contains("sk-12.txt"));
}

#[test]
fn test_rfi_dangling_manager_renders_placeholder() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    cmd(&tmp)
        .args(["contact", "add", "dana@arch.example", "--first", "Dana"])
        .assert()
        .success();
    cmd(&tmp)
        .args([
            "rfi",
            "new",
            "Window head detail",
            "--manager",
            "dana@arch.example",
        ])
        .assert()
        .success();
    cmd(&tmp)
        .args(["contact", "remove", "dana@arch.example"])
        .assert()
        .success();

    cmd(&tmp)
        .args(["rfi", "show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("—"));
}

// ============================================================================
// Submittal Command Tests
// ============================================================================

#[test]
fn test_submittal_lifecycle() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");

    cmd(&tmp)
        .args([
            "submittal",
            "new",
            "Rebar shop drawings",
            "--type",
            "shop drawing",
            "--spec-section",
            "03 20 00",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("#1"));

    cmd(&tmp)
        .args(["submittal", "edit", "1", "--status", "approved"])
        .assert()
        .success();

    cmd(&tmp)
        .args(["submittal", "list", "--status", "approved"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rebar shop drawings"));
}

#[test]
fn test_submittal_update_journal_has_no_title() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    cmd(&tmp)
        .args(["submittal", "new", "Rebar shop drawings"])
        .assert()
        .success();
    cmd(&tmp)
        .args(["submittal", "edit", "1", "--status", "open"])
        .assert()
        .success();

    cmd(&tmp)
        .args(["activity"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Submittal #1 updated"));
}

// ============================================================================
// Specification Command Tests
// ============================================================================

#[test]
fn test_spec_list_sorted_by_section_number() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");

    cmd(&tmp)
        .args(["spec", "add", "09 91 23", "Interior Painting"])
        .assert()
        .success();
    cmd(&tmp)
        .args(["spec", "add", "03 30 00", "Cast-in-Place Concrete"])
        .assert()
        .success();

    let out = stdout_of({
        let mut c = cmd(&tmp);
        c.args(["spec", "list"]);
        c
    });
    let concrete = out.find("03 30 00").unwrap();
    let painting = out.find("09 91 23").unwrap();
    assert!(concrete < painting);
}

#[test]
fn test_spec_edit_and_remove() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    cmd(&tmp)
        .args(["spec", "add", "03 30 00", "Concrete"])
        .assert()
        .success();

    cmd(&tmp)
        .args([
            "spec",
            "edit",
            "03 30 00",
            "--title",
            "Cast-in-Place Concrete",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cast-in-Place Concrete"));

    cmd(&tmp)
        .args(["spec", "remove", "03 30 00"])
        .assert()
        .success();
    cmd(&tmp)
        .args(["spec", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No specification sections found."));
}

// ============================================================================
// Activity Feed Tests
// ============================================================================

#[test]
fn test_activity_newest_first() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    cmd(&tmp)
        .args(["task", "new", "First task"])
        .assert()
        .success();
    cmd(&tmp)
        .args(["task", "new", "Second task"])
        .assert()
        .success();

    let out = stdout_of({
        let mut c = cmd(&tmp);
        c.args(["activity"]);
        c
    });
    let second = out.find("Second task").unwrap();
    let first = out.find("First task").unwrap();
    assert!(second < first);
}

#[test]
fn test_activity_kind_filter() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    cmd(&tmp)
        .args(["task", "new", "Pour footings"])
        .assert()
        .success();
    cmd(&tmp)
        .args(["rfi", "new", "Footing depth"])
        .assert()
        .success();

    cmd(&tmp)
        .args(["activity", "--kind", "rfi"])
        .assert()
        .success()
        .stdout(predicate::str::contains("RFI #1"))
        .stdout(predicate::str::contains("Task #1").not());
}

#[test]
fn test_activity_removed_by_project_cascade() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    setup_project(&tmp, "Warehouse");
    cmd(&tmp)
        .args(["-p", "Tower A", "task", "new", "Pour footings"])
        .assert()
        .success();
    cmd(&tmp)
        .args(["-p", "Warehouse", "task", "new", "Grade the lot"])
        .assert()
        .success();

    cmd(&tmp)
        .args(["project", "delete", "Tower A", "-y"])
        .assert()
        .success();

    let out = stdout_of({
        let mut c = cmd(&tmp);
        c.args(["activity", "--all-projects"]);
        c
    });
    assert!(!out.contains("Pour footings"));
    assert!(out.contains("Grade the lot"));
}

// ============================================================================
// Output Format Tests
// ============================================================================

#[test]
fn test_list_format_id() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");

    let out = stdout_of({
        let mut c = cmd(&tmp);
        c.args(["project", "list", "-f", "id"]);
        c
    });
    assert_eq!(out.lines().count(), 1);
    assert!(!out.contains("Tower A"));
}

#[test]
fn test_list_format_csv_escapes() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower, The Second");

    cmd(&tmp)
        .args(["project", "list", "-f", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Tower, The Second\""));
}

#[test]
fn test_list_format_json_parses() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    cmd(&tmp)
        .args(["task", "new", "Pour footings"])
        .assert()
        .success();

    let out = stdout_of({
        let mut c = cmd(&tmp);
        c.args(["task", "list", "-f", "json"]);
        c
    });
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value[0]["title"], "Pour footings");
    assert_eq!(value[0]["taskNumber"], 1);
}

// ============================================================================
// Status Dashboard Tests
// ============================================================================

#[test]
fn test_status_dashboard() {
    let tmp = setup_workspace();
    setup_project(&tmp, "Tower A");
    cmd(&tmp)
        .args(["task", "new", "Pour footings"])
        .assert()
        .success();
    cmd(&tmp)
        .args(["rfi", "new", "Footing depth", "--status", "open"])
        .assert()
        .success();

    cmd(&tmp)
        .args(["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tower A"))
        .stdout(predicate::str::contains("Storage: local"));
}

// ============================================================================
// SQLite Backend Tests
// ============================================================================

#[test]
fn test_sqlite_rfi_gap_numbering() {
    let tmp = setup_sqlite_workspace();
    setup_project(&tmp, "Tower A");

    cmd(&tmp)
        .args(["rfi", "new", "Footing depth"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#1"));
    cmd(&tmp)
        .args(["rfi", "new", "Window head detail"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#2"));
    cmd(&tmp)
        .args(["rfi", "delete", "2", "-y"])
        .assert()
        .success();
    cmd(&tmp)
        .args(["rfi", "new", "Roof drain overflow"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#3"));
}

#[test]
fn test_sqlite_document_tree_operations() {
    let tmp = setup_sqlite_workspace();
    setup_project(&tmp, "Tower A");

    cmd(&tmp)
        .args(["doc", "mkdir", "Structural"])
        .assert()
        .success();
    cmd(&tmp)
        .args(["doc", "mkdir", "Calcs", "--in", "Structural"])
        .assert()
        .success();
    cmd(&tmp)
        .args(["doc", "copy", "Structural", "--root"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Structural (copy)"));
    cmd(&tmp)
        .args(["doc", "delete", "Structural", "-y"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 node(s)"));

    cmd(&tmp)
        .args(["doc", "path", "Structural (copy)/Calcs"])
        .assert()
        .success();
}

#[test]
fn test_sqlite_cascade_delete() {
    let tmp = setup_sqlite_workspace();
    setup_project(&tmp, "Tower A");
    setup_project(&tmp, "Warehouse");
    cmd(&tmp)
        .args(["-p", "Tower A", "task", "new", "Pour footings"])
        .assert()
        .success();

    cmd(&tmp)
        .args(["project", "delete", "Tower A", "-y"])
        .assert()
        .success();

    cmd(&tmp)
        .args(["project", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tower A").not());
}

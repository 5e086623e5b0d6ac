//! CLI smoke tests for the bizc binary
//!
//! Each test points HOME and the XDG directories at a temp dir so the real
//! session store and logs are never touched. No command here reaches the
//! network.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn bizc(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("bizc").expect("bizc binary should build");
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    bizc(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("report"))
        .stdout(predicate::str::contains("login"));
}

#[test]
fn test_report_help_lists_lifecycle() {
    let home = TempDir::new().unwrap();
    bizc(&home)
        .args(["report", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("publish"))
        .stdout(predicate::str::contains("cancel"))
        .stdout(predicate::str::contains("export"));
}

#[test]
fn test_publish_requires_login() {
    let home = TempDir::new().unwrap();
    bizc(&home)
        .args(["report", "publish", "r-1", "wf-0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not signed in"))
        .stderr(predicate::str::contains("bizc login"));
}

#[test]
fn test_invalid_item_id_rejected() {
    let home = TempDir::new().unwrap();
    bizc(&home)
        .args(["report", "publish", "r-1", "item-0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("wf-N or role-N"));
}

#[test]
fn test_login_whoami_logout() {
    let home = TempDir::new().unwrap();
    // {"did":"did:example:1","username":"alice"}
    let token = "eyJhbGciOiJIUzI1NiJ9.eyJkaWQiOiJkaWQ6ZXhhbXBsZToxIiwidXNlcm5hbWUiOiJhbGljZSJ9.sig";

    bizc(&home)
        .args(["login", "--token", token])
        .assert()
        .success()
        .stdout(predicate::str::contains("alice"));

    bizc(&home)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("alice"))
        .stdout(predicate::str::contains("did:example:1"))
        .stdout(predicate::str::contains("Project:"));

    bizc(&home).arg("logout").assert().success();

    bizc(&home)
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not signed in"));
}

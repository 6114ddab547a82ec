//! Integration tests for the Fort CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.
//! The passphrase comes from `FORT_PASSPHRASE` and record passwords
//! from piped stdin, so nothing here needs a terminal.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const PASS: &str = "correcthorsebattery";

/// Helper: a `fort` command using the config file inside `tmp`.
fn fort(tmp: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("fort").expect("binary should exist");
    cmd.arg("--config")
        .arg(tmp.path().join("fortrc"))
        .env_remove("FORT_LOG")
        .env_remove("FORT_NEW_PASSPHRASE")
        .env("FORT_PASSPHRASE", PASS);
    cmd
}

fn init_vault(tmp: &TempDir) {
    fort(tmp).arg("init").assert().success();
}

#[test]
fn help_flag_shows_usage() {
    #[allow(deprecated)]
    Command::cargo_bin("fort")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("password vault"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("lock"))
        .stdout(predicate::str::contains("unlock"))
        .stdout(predicate::str::contains("export"))
        .stdout(predicate::str::contains("session"));
}

#[test]
fn version_flag_shows_version() {
    #[allow(deprecated)]
    Command::cargo_bin("fort")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fort"));
}

#[test]
fn no_args_shows_help() {
    #[allow(deprecated)]
    Command::cargo_bin("fort")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn status_before_init_creates_config() {
    let tmp = TempDir::new().unwrap();

    fort(&tmp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("not initialized"));

    tmp.child("fortrc").assert("firstrun=true\n");
}

#[test]
fn init_creates_credential_and_clears_first_run() {
    let tmp = TempDir::new().unwrap();
    init_vault(&tmp);

    tmp.child("fort.pph").assert(predicate::path::exists());
    tmp.child("fortrc")
        .assert(predicate::str::contains("firstrun=false"));

    // A second init refuses to replace the credential.
    fort(&tmp).arg("init").assert().failure();
}

#[test]
fn init_rejects_short_passphrase() {
    let tmp = TempDir::new().unwrap();

    fort(&tmp)
        .env("FORT_PASSPHRASE", "short")
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 8"));
}

#[test]
fn record_commands_need_init() {
    let tmp = TempDir::new().unwrap();

    fort(&tmp)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not initialized"));
}

#[test]
fn add_list_show_roundtrip() {
    let tmp = TempDir::new().unwrap();
    init_vault(&tmp);

    fort(&tmp)
        .args(["add", "bank", "--username", "alice", "--url", "bank.example"])
        .write_stdin("p1\n")
        .assert()
        .success();

    fort(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("bank"))
        .stdout(predicate::str::contains("alice"))
        .stdout(predicate::str::contains("http://bank.example"));

    fort(&tmp)
        .args(["show", "bank", "--reveal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("p1"));

    fort(&tmp)
        .args(["show", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn lock_and_unlock_toggle_state() {
    let tmp = TempDir::new().unwrap();
    init_vault(&tmp);
    fort(&tmp)
        .args(["add", "mail"])
        .write_stdin("secret\n")
        .assert()
        .success();

    fort(&tmp).arg("lock").assert().success();
    tmp.child("fort.iv").assert(predicate::path::exists());
    fort(&tmp)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("State:        locked"))
        .stdout(predicate::str::contains("unlocked").not());

    // Record commands work on a locked vault and leave it locked.
    fort(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("mail"));
    tmp.child("fort.iv").assert(predicate::path::exists());

    fort(&tmp).arg("unlock").assert().success();
    tmp.child("fort.iv").assert(predicate::path::missing());
}

#[test]
fn wrong_passphrase_keeps_vault_locked() {
    let tmp = TempDir::new().unwrap();
    init_vault(&tmp);
    fort(&tmp).arg("lock").assert().success();

    fort(&tmp)
        .env("FORT_PASSPHRASE", "not the passphrase")
        .arg("unlock")
        .assert()
        .failure()
        .stderr(predicate::str::contains("mismatch"));

    tmp.child("fort.iv").assert(predicate::path::exists());
}

#[test]
fn export_text_to_stdout() {
    let tmp = TempDir::new().unwrap();
    init_vault(&tmp);
    fort(&tmp)
        .args(["add", "bank", "-u", "alice", "--notes", "pin"])
        .write_stdin("p1\n")
        .assert()
        .success();

    fort(&tmp)
        .arg("export")
        .assert()
        .success()
        .stdout(predicate::eq("bank\talice\tp1\t\tpin\n"));
}

#[test]
fn export_json_to_file() {
    let tmp = TempDir::new().unwrap();
    init_vault(&tmp);
    fort(&tmp)
        .args(["add", "bank"])
        .write_stdin("p1\n")
        .assert()
        .success();

    let out = TempDir::new().unwrap();
    let file = out.child("records.json");
    fort(&tmp)
        .args(["export", "--format", "json", "--output"])
        .arg(file.path())
        .assert()
        .success();

    file.assert(predicate::str::contains("\"title\": \"bank\""));
}

#[test]
fn favorite_edit_and_remove() {
    let tmp = TempDir::new().unwrap();
    init_vault(&tmp);
    for title in ["alpha", "beta"] {
        fort(&tmp)
            .args(["add", title])
            .write_stdin("pw\n")
            .assert()
            .success();
    }

    fort(&tmp)
        .args(["favorite", "beta"])
        .assert()
        .success()
        .stdout(predicate::str::contains("marked as favorite"));

    fort(&tmp)
        .args(["edit", "alpha", "--new-title", "gamma", "--username", "carol"])
        .assert()
        .success();

    fort(&tmp)
        .args(["export"])
        .assert()
        .success()
        .stdout(predicate::eq("beta\t\tpw\t\t\ngamma\tcarol\tpw\t\t\n"));

    fort(&tmp)
        .args(["remove", "gamma", "--force"])
        .assert()
        .success();

    fort(&tmp)
        .args(["export"])
        .assert()
        .success()
        .stdout(predicate::eq("beta\t\tpw\t\t\n"));
}

#[test]
fn passwd_changes_master_passphrase() {
    let tmp = TempDir::new().unwrap();
    init_vault(&tmp);
    fort(&tmp)
        .args(["add", "bank"])
        .write_stdin("p1\n")
        .assert()
        .success();
    fort(&tmp).arg("lock").assert().success();

    fort(&tmp)
        .env("FORT_NEW_PASSPHRASE", "a much newer passphrase")
        .arg("passwd")
        .assert()
        .success();
    tmp.child("fort.iv").assert(predicate::path::exists());

    fort(&tmp).arg("list").assert().failure();
    fort(&tmp)
        .env("FORT_PASSPHRASE", "a much newer passphrase")
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("bank"));
}

#[test]
fn config_sets_and_reads_values() {
    let tmp = TempDir::new().unwrap();

    fort(&tmp)
        .args(["config", "idleinterval", "10"])
        .assert()
        .success();
    fort(&tmp)
        .args(["config", "idleinterval"])
        .assert()
        .success()
        .stdout(predicate::str::contains("10"));

    fort(&tmp)
        .args(["config", "idleinterval", "soon"])
        .assert()
        .failure();
}

/// Names of `*.plain` record files in the vault directory.
fn plain_files(tmp: &TempDir) -> Vec<String> {
    std::fs::read_dir(tmp.path())
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".plain"))
        .collect()
}

#[test]
fn failed_passwd_leaves_locked_vault_locked() {
    let tmp = TempDir::new().unwrap();
    init_vault(&tmp);
    fort(&tmp)
        .args(["add", "bank"])
        .write_stdin("p1\n")
        .assert()
        .success();
    fort(&tmp).arg("lock").assert().success();

    fort(&tmp)
        .env("FORT_NEW_PASSPHRASE", "short")
        .arg("passwd")
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 8"));

    tmp.child("fort.iv").assert(predicate::path::exists());
    assert!(plain_files(&tmp).is_empty());

    // The old passphrase still opens the vault.
    fort(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("bank"));
    tmp.child("fort.iv").assert(predicate::path::exists());
}

#[test]
fn passwd_with_wrong_current_passphrase_touches_nothing() {
    let tmp = TempDir::new().unwrap();
    init_vault(&tmp);
    fort(&tmp).arg("lock").assert().success();

    fort(&tmp)
        .env("FORT_PASSPHRASE", "not the passphrase")
        .env("FORT_NEW_PASSPHRASE", "a much newer passphrase")
        .arg("passwd")
        .assert()
        .failure();

    tmp.child("fort.iv").assert(predicate::path::exists());
    fort(&tmp).arg("unlock").assert().success();
}

#[test]
fn session_first_run_creates_vault_and_clears_first_run() {
    let tmp = TempDir::new().unwrap();

    fort(&tmp)
        .arg("session")
        .write_stdin("quit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Vault created"));

    tmp.child("fort.pph").assert(predicate::path::exists());
    tmp.child("fortrc")
        .assert(predicate::str::contains("firstrun=false"));
    // Quitting locks the new vault.
    tmp.child("fort.iv").assert(predicate::path::exists());
}

#[test]
fn session_first_run_rejects_short_passphrase() {
    let tmp = TempDir::new().unwrap();

    fort(&tmp)
        .env("FORT_PASSPHRASE", "short")
        .arg("session")
        .write_stdin("quit\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 8"));

    tmp.child("fort.pph").assert(predicate::path::missing());
    tmp.child("fortrc")
        .assert(predicate::str::contains("firstrun=true"));
}

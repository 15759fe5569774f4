//! Integration tests for the PassVault CLI.
//!
//! These drive the binary end-to-end with `assert_cmd`.  Passwords come
//! from `PASSVAULT_PASSWORD` and Argon2 runs with minimal settings so no
//! test ever needs a terminal.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const PASSWORD: &str = "correct-horse";

/// Helper: get a Command pointing at the passvault binary, run in `dir`.
fn passvault(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("passvault").expect("binary should exist");
    cmd.current_dir(dir.path())
        .env_remove("PASSVAULT_VAULT")
        .env_remove("PASSVAULT_NEW_PASSWORD")
        .env("PASSVAULT_PASSWORD", PASSWORD);
    cmd
}

/// Create `passvault.vault` in `dir` with fast KDF settings.
fn init_vault(dir: &TempDir) {
    passvault(dir)
        .args(["init", "--time", "1", "--memory", "8192", "--parallelism", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Vault created"));
}

#[test]
fn help_flag_shows_usage() {
    let dir = TempDir::new().unwrap();
    passvault(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("update"))
        .stdout(predicate::str::contains("remove"))
        .stdout(predicate::str::contains("passwd"));
}

#[test]
fn no_args_shows_help() {
    let dir = TempDir::new().unwrap();
    passvault(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn init_creates_vault_in_working_dir() {
    let dir = TempDir::new().unwrap();
    init_vault(&dir);

    dir.child("passvault.vault")
        .assert(predicate::str::contains("\"version\": 1"))
        .assert(predicate::str::contains("\"ciphertext\""));
}

#[test]
fn init_twice_fails() {
    let dir = TempDir::new().unwrap();
    init_vault(&dir);

    passvault(&dir)
        .args(["init", "--time", "1", "--memory", "8192", "--parallelism", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn init_rejects_short_password() {
    let dir = TempDir::new().unwrap();
    passvault(&dir)
        .env("PASSVAULT_PASSWORD", "short")
        .args(["init", "--memory", "8192"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 8"));
    dir.child("passvault.vault").assert(predicate::path::missing());
}

#[test]
fn add_get_list_remove_flow() {
    let dir = TempDir::new().unwrap();
    init_vault(&dir);

    passvault(&dir)
        .args([
            "add",
            "Email",
            "--username",
            "alice@example.com",
            "--field",
            "password=secret1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Entry 'Email' added (1 total)"));

    passvault(&dir)
        .args(["get", "Email", "--field", "password"])
        .assert()
        .success()
        .stdout("secret1\n");

    passvault(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Email"))
        .stdout(predicate::str::contains("alice@example.com"))
        .stdout(predicate::str::contains("secret1").not());

    passvault(&dir)
        .args(["remove", "Email", "--force"])
        .assert()
        .success();

    passvault(&dir)
        .args(["get", "Email"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn duplicate_add_fails() {
    let dir = TempDir::new().unwrap();
    init_vault(&dir);

    for expect_ok in [true, false] {
        let assert = passvault(&dir)
            .args(["add", "Email", "--field", "password=x"])
            .assert();
        if expect_ok {
            assert.success();
        } else {
            assert
                .failure()
                .stderr(predicate::str::contains("already exists"));
        }
    }
}

#[test]
fn update_renames_and_sets_fields() {
    let dir = TempDir::new().unwrap();
    init_vault(&dir);

    passvault(&dir)
        .args(["add", "Email", "--field", "password=old"])
        .assert()
        .success();

    passvault(&dir)
        .args([
            "update",
            "Email",
            "--rename",
            "Mail",
            "--field",
            "password=new",
            "--field",
            "pin=1234",
        ])
        .assert()
        .success();

    passvault(&dir)
        .args(["get", "Mail", "--field", "password"])
        .assert()
        .success()
        .stdout("new\n");
    passvault(&dir)
        .args(["get", "Mail", "--field", "pin"])
        .assert()
        .success()
        .stdout("1234\n");
}

#[test]
fn wrong_password_is_conflated_error() {
    let dir = TempDir::new().unwrap();
    init_vault(&dir);

    passvault(&dir)
        .env("PASSVAULT_PASSWORD", "not-the-password")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Incorrect password or corrupted vault",
        ));
}

#[test]
fn passwd_switches_password() {
    let dir = TempDir::new().unwrap();
    init_vault(&dir);
    passvault(&dir)
        .args(["add", "Email", "--field", "password=secret1"])
        .assert()
        .success();

    passvault(&dir)
        .env("PASSVAULT_NEW_PASSWORD", "battery-staple")
        .arg("passwd")
        .assert()
        .success();

    passvault(&dir).arg("list").assert().failure();
    passvault(&dir)
        .env("PASSVAULT_PASSWORD", "battery-staple")
        .args(["get", "Email", "--field", "password"])
        .assert()
        .success()
        .stdout("secret1\n");
}

#[test]
fn vault_flag_overrides_default_location() {
    let dir = TempDir::new().unwrap();
    let custom = dir.path().join("custom.vault");

    passvault(&dir)
        .arg("--vault")
        .arg(&custom)
        .args(["init", "--time", "1", "--memory", "8192", "--parallelism", "1"])
        .assert()
        .success();

    assert!(custom.exists());
    dir.child("passvault.vault").assert(predicate::path::missing());
}

#[test]
fn config_file_sets_default_vault() {
    let dir = TempDir::new().unwrap();
    dir.child(".passvault.toml")
        .write_str("default_vault = \"secrets.vault\"\nkdf_memory_kib = 8192\nkdf_time_cost = 1\nkdf_parallelism = 1\n")
        .unwrap();

    passvault(&dir).arg("init").assert().success();
    dir.child("secrets.vault").assert(predicate::path::exists());
}

#[test]
fn get_on_missing_vault_fails() {
    let dir = TempDir::new().unwrap();
    passvault(&dir)
        .args(["get", "Email"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Vault not found"));
}

#[test]
fn completions_bash_outputs_script() {
    let dir = TempDir::new().unwrap();
    passvault(&dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("passvault"));
}

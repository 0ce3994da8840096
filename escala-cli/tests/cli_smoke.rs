//! Smoke tests to verify command wiring

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("escala").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("migrate"));
}

#[test]
fn test_serve_help() {
    let mut cmd = Command::cargo_bin("escala").unwrap();
    cmd.arg("serve").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--memory"))
        .stdout(predicate::str::contains("--cors-permissive"))
        .stdout(predicate::str::contains("PORT"));
}

#[test]
fn test_migrate_without_database_url_fails() {
    let mut cmd = Command::cargo_bin("escala").unwrap();
    cmd.arg("migrate")
        .env_remove("DATABASE_URL")
        .current_dir(std::env::temp_dir());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("DATABASE_URL not set"));
}

#[test]
fn test_version() {
    let mut cmd = Command::cargo_bin("escala").unwrap();
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

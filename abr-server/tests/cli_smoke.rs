//! Smoke tests for the abr-server binary

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_flags() {
    let mut cmd = Command::cargo_bin("abr-server").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--database-url"))
        .stdout(predicate::str::contains("--cors-permissive"));
}

#[test]
fn test_version() {
    let mut cmd = Command::cargo_bin("abr-server").unwrap();
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_rejects_bad_bind_address() {
    let mut cmd = Command::cargo_bin("abr-server").unwrap();
    cmd.args(["--bind", "nowhere"]);

    cmd.assert().failure();
}

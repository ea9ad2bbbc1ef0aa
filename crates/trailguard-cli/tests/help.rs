use assert_cmd::Command;
use predicates::prelude::*;

/// Helper to get a Command for the trailguard binary.
#[allow(deprecated)]
fn trailguard_cmd() -> Command {
    Command::cargo_bin("trailguard").unwrap()
}

#[test]
fn help_works() {
    trailguard_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("verify"))
        .stdout(predicate::str::contains("explain"));
}

#[test]
fn verify_help_lists_evidence_flags() {
    trailguard_cmd()
        .args(["verify", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--records"))
        .stdout(predicate::str::contains("--snapshot"))
        .stdout(predicate::str::contains("--expected-head"));
}

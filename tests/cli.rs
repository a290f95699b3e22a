// ABOUTME: Integration tests for the act-container CLI commands.
// ABOUTME: Runs the binary on a host stripped of runtimes to check output and exit codes.

use assert_cmd::Command;
use predicates::prelude::*;

fn act_container_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("act-container"))
}

/// A command that cannot find any runtime: no binaries on PATH, no hints,
/// and a custom socket that does not exist.
fn isolated_cmd(dir: &std::path::Path) -> Command {
    let mut cmd = act_container_cmd();
    cmd.current_dir(dir)
        .env("PATH", "")
        .env_remove("DOCKER_HOST")
        .env_remove("PODMAN_HOST")
        .env_remove("ACT_CONTAINER_RUNTIME")
        .env_remove("ACT_CONTAINER_SOCKET")
        .arg("--container-socket")
        .arg(dir.join("missing.sock"));
    cmd
}

#[test]
fn help_shows_commands() {
    act_container_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("detect"))
        .stdout(predicate::str::contains("runtimes"))
        .stdout(predicate::str::contains("doctor"))
        .stdout(predicate::str::contains("socket"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("--container-runtime"))
        .stdout(predicate::str::contains("--container-socket"));
}

#[test]
fn rejects_unknown_runtime_flag() {
    act_container_cmd()
        .args(["--container-runtime", "containerd", "detect"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown container runtime"));
}

#[test]
fn missing_explicit_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    act_container_cmd()
        .current_dir(dir.path())
        .args(["--config", "absent.yml", "detect"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration file not found"));
}

#[test]
fn detect_without_runtime_prints_report() {
    let dir = tempfile::tempdir().unwrap();
    isolated_cmd(dir.path())
        .arg("detect")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No container runtime detected"))
        .stderr(predicate::str::contains("https://docs.docker.com/get-docker/"))
        .stderr(predicate::str::contains("--container-runtime=podman"));
}

#[test]
fn detect_json_reports_unknown() {
    let dir = tempfile::tempdir().unwrap();
    isolated_cmd(dir.path())
        .args(["detect", "--json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains(r#""runtime":"unknown""#))
        .stdout(predicate::str::contains(r#""source":"none""#));
}

#[test]
fn runtimes_is_empty_without_runtime() {
    let dir = tempfile::tempdir().unwrap();
    isolated_cmd(dir.path())
        .args(["runtimes", "--json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn run_without_runtime_explains_why() {
    let dir = tempfile::tempdir().unwrap();
    isolated_cmd(dir.path())
        .args(["run", "alpine:3", "--", "true"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no container runtime available"))
        .stderr(predicate::str::contains("Podman"));
}

#[test]
fn run_requires_a_command() {
    act_container_cmd()
        .args(["run", "alpine:3"])
        .assert()
        .failure();
}

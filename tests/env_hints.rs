// ABOUTME: Environment-hint tests against the real process environment.
// ABOUTME: Uses temp-env so variables are restored after each case.

use act_container::runtime::candidates::process_env;
use act_container::runtime::{RuntimeType, check_environment_hints};

const VARS: [&str; 3] = ["ACT_CONTAINER_RUNTIME", "PODMAN_HOST", "DOCKER_HOST"];

fn hints_with(set: &[(&str, &str)]) -> RuntimeType {
    let vars: Vec<(&str, Option<&str>)> = VARS
        .iter()
        .map(|name| {
            let value = set.iter().find(|(k, _)| k == name).map(|(_, v)| *v);
            (*name, value)
        })
        .collect();
    temp_env::with_vars(vars, || check_environment_hints(process_env))
}

#[test]
fn runtime_variable_in_any_case() {
    assert_eq!(hints_with(&[("ACT_CONTAINER_RUNTIME", "docker")]), RuntimeType::Docker);
    assert_eq!(hints_with(&[("ACT_CONTAINER_RUNTIME", "DoCkEr")]), RuntimeType::Docker);
    assert_eq!(hints_with(&[("ACT_CONTAINER_RUNTIME", "PODMAN")]), RuntimeType::Podman);
}

#[test]
fn unrecognized_runtime_variable_gives_unknown() {
    assert_eq!(hints_with(&[("ACT_CONTAINER_RUNTIME", "banana")]), RuntimeType::Unknown);
}

#[test]
fn podman_host_alone_hints_podman() {
    assert_eq!(hints_with(&[("PODMAN_HOST", "unix:///test")]), RuntimeType::Podman);
}

#[test]
fn docker_host_alone_hints_docker() {
    assert_eq!(
        hints_with(&[("DOCKER_HOST", "unix:///var/run/docker.sock")]),
        RuntimeType::Docker
    );
}

#[test]
fn nothing_set_gives_unknown() {
    assert_eq!(hints_with(&[]), RuntimeType::Unknown);
}

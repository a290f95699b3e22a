// ABOUTME: End-to-end tests against whatever runtime the host provides.
// ABOUTME: Each test skips when no Docker or Podman daemon is reachable.

mod support;

use act_container::runtime::{
    Container, ContainerFactory, ContainerOps, CopyOps, ExecOps, FileEntry, Health, ImageOps,
    LogWriter, LogOps, NewContainerInput, RuntimeDetector,
};
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::Arc;

const IMAGE: &str = "alpine:3.20";

/// A started container, or `None` when the host has no usable runtime.
async fn started(name: &str) -> Option<Container> {
    support::init_tracing();
    let factory = ContainerFactory::new(Arc::new(RuntimeDetector::new()));
    let container = factory
        .new_container({
            let mut input = NewContainerInput::new(IMAGE, name);
            input.entrypoint = vec!["tail".into(), "-f".into(), "/dev/null".into()];
            input.working_dir = "/work".into();
            input
        })
        .await;

    if container.is_null() {
        eprintln!("skipping: no container runtime available");
        return None;
    }
    if let Err(e) = container.pull(false).await {
        eprintln!("skipping: cannot pull {IMAGE}: {e}");
        return None;
    }
    container.create(&[], &[]).await.expect("create");
    container.start(false).await.expect("start");
    Some(container)
}

async fn cleanup(container: Container) {
    container.remove().await.expect("remove");
    container.remove().await.expect("remove is idempotent");
    container.close().await.expect("close");
}

#[tokio::test]
async fn exec_reports_exit_status() {
    let Some(container) = started("act-container-live-exec").await else {
        return;
    };
    let env = HashMap::from([("GREETING".to_string(), "hi".to_string())]);

    container
        .exec(&["sh".into(), "-c".into(), "test \"$GREETING\" = hi".into()], &env, "", "")
        .await
        .expect("exec succeeds");
    assert!(container.exec(&["false".into()], &env, "", "").await.is_err());
    assert_eq!(container.health().await, Health::Healthy);

    cleanup(container).await;
}

#[tokio::test]
async fn files_round_trip_through_the_container() {
    let Some(container) = started("act-container-live-copy").await else {
        return;
    };

    container
        .copy(
            "/var/run/act/",
            &[FileEntry::new("env", 0o644, "FOO=bar\nMULTI<<EOF\na\nb\nEOF\n")],
        )
        .await
        .expect("copy");

    let mut env = HashMap::new();
    container
        .update_from_env("/var/run/act/env", &mut env)
        .await
        .expect("read env file");
    assert_eq!(env["FOO"], "bar");
    assert_eq!(env["MULTI"], "a\nb");

    container
        .update_from_env("/var/run/act/missing", &mut env)
        .await
        .expect("missing env file is fine");

    let mut stream = container.container_archive("/var/run/act/env").await.expect("archive");
    let mut total = 0;
    while let Some(chunk) = stream.next().await {
        total += chunk.expect("chunk").len();
    }
    assert!(total > 0);

    container.update_from_image_env(&mut env).await.expect("image env");
    assert!(env.contains_key("PATH"));

    cleanup(container).await;
}

#[tokio::test]
async fn log_writer_can_be_swapped() {
    let Some(container) = started("act-container-live-logs").await else {
        return;
    };
    let out: LogWriter = Box::new(std::io::sink());
    let err: LogWriter = Box::new(std::io::sink());
    let _previous = container.replace_log_writer(out, err);
    cleanup(container).await;
}

// ABOUTME: Integration tests for the container factory and the null adapter.
// ABOUTME: Covers selection, forcing, the process-wide override and its concurrency.

mod support;

use act_container::runtime::{
    Container, ContainerFactory, ContainerOps, CopyOps, EnvironmentError, EnvironmentInfo,
    ExecOps, Health, ImageOps, LogOps, LogWriter, NewContainerInput, OverrideGuard,
    ResolutionSource, RuntimeErrorKind, RuntimeType, clear_runtime_override, runtime_override,
    set_runtime_override,
};
use serial_test::serial;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use support::{FakeHost, detector, detector_with};

fn factory(host: FakeHost) -> ContainerFactory {
    ContainerFactory::new(Arc::new(detector(host, &[])))
}

fn input() -> NewContainerInput {
    NewContainerInput::new("node:20-bookworm", "act-test-job")
}

mod selection {
    use super::*;

    #[tokio::test]
    #[serial]
    async fn auto_selects_detected_runtime() {
        let factory = factory(FakeHost::docker_only());
        let container = factory.new_container(input()).await;
        assert!(matches!(container, Container::Docker(_)));
        assert_eq!(container.runtime(), RuntimeType::Docker);
        assert_eq!(container.input().image, "node:20-bookworm");
    }

    #[tokio::test]
    #[serial]
    async fn auto_selects_podman_when_it_scores_higher() {
        let container = factory(FakeHost::both()).new_container(input()).await;
        assert!(matches!(container, Container::Podman(_)));
    }

    #[tokio::test]
    #[serial]
    async fn nothing_available_gives_null_adapter() {
        let container = factory(FakeHost::new()).new_container(input()).await;
        assert!(container.is_null());
        assert_eq!(container.runtime(), RuntimeType::Unknown);
    }

    #[tokio::test]
    #[serial]
    async fn forced_runtime_is_used_when_it_verifies() {
        let factory = factory(FakeHost::both());
        let container = factory
            .new_container_with_runtime(input(), RuntimeType::Docker)
            .await;
        assert!(matches!(container, Container::Docker(_)));
    }

    #[tokio::test]
    #[serial]
    async fn forced_runtime_that_fails_verification_gives_null_adapter() {
        let factory = factory(FakeHost::docker_only());
        let container = factory
            .new_container_with_runtime(input(), RuntimeType::Podman)
            .await;
        assert!(container.is_null());

        let err = container.create(&[], &[]).await.unwrap_err();
        assert_eq!(err.kind(), RuntimeErrorKind::ForcedUnavailable);
        assert!(matches!(
            err,
            EnvironmentError::ForcedUnavailable {
                runtime: RuntimeType::Podman,
                ..
            }
        ));
    }

    #[tokio::test]
    #[serial]
    async fn forcing_unknown_gives_null_adapter() {
        let container = factory(FakeHost::both())
            .new_container_with_runtime(input(), RuntimeType::Unknown)
            .await;
        assert!(container.is_null());
    }

    #[tokio::test]
    #[serial]
    async fn available_runtimes_is_never_absent() {
        assert!(factory(FakeHost::new()).available_runtimes().await.is_empty());
        assert_eq!(
            factory(FakeHost::docker_only()).available_runtimes().await,
            vec![RuntimeType::Docker]
        );
    }

    #[tokio::test]
    #[serial]
    async fn client_without_runtime_is_unavailable() {
        let err = factory(FakeHost::new()).container_client().await.unwrap_err();
        assert_eq!(err.kind(), RuntimeErrorKind::Unavailable);
        assert!(err.to_string().contains("No container runtime detected"));
    }
}

mod null_adapter {
    use super::*;
    use std::io::Write;

    async fn null() -> Container {
        factory(FakeHost::new()).new_container(input()).await
    }

    #[tokio::test]
    #[serial]
    async fn every_side_effect_reports_install_guidance() {
        let container = null().await;
        let mut env = HashMap::new();

        let errors = vec![
            container.create(&[], &[]).await.unwrap_err(),
            container.start(true).await.unwrap_err(),
            container.pull(false).await.unwrap_err(),
            container.copy("/tmp", &[]).await.unwrap_err(),
            container
                .copy_dir("/tmp", std::path::Path::new("."), true)
                .await
                .unwrap_err(),
            container
                .exec(&["true".to_string()], &env, "", "")
                .await
                .unwrap_err(),
            container
                .update_from_env("/tmp/env", &mut env)
                .await
                .unwrap_err(),
            container.update_from_image_env(&mut env).await.unwrap_err(),
            container.remove().await.unwrap_err(),
            container.close().await.unwrap_err(),
        ];

        for err in errors {
            assert_eq!(err.kind(), RuntimeErrorKind::Unavailable);
            let text = err.to_string();
            assert!(text.contains("Docker"), "missing Docker guidance: {text}");
            assert!(text.contains("Podman"), "missing Podman guidance: {text}");
            assert!(text.contains("https://docs.docker.com/get-docker/"));
            assert!(text.contains("https://podman.io/getting-started/installation"));
        }
        assert!(container.container_archive("/tmp").await.is_err());
    }

    #[tokio::test]
    #[serial]
    async fn report_is_computed_once_per_handle() {
        let host = Arc::new(FakeHost::new());
        let factory = ContainerFactory::new(Arc::new(detector_with(Arc::clone(&host), &[])));
        let container = factory.new_container(input()).await;

        container.create(&[], &[]).await.unwrap_err();
        let after_first = host.binary_checks();
        container.start(false).await.unwrap_err();
        container.pull(true).await.unwrap_err();
        assert_eq!(host.binary_checks(), after_first);
    }

    #[tokio::test]
    #[serial]
    async fn metadata_uses_inert_linux_defaults() {
        let container = null().await;
        assert_eq!(container.act_path(), "/opt/act");
        assert_eq!(container.path_variable_name(), "PATH");
        assert_eq!(
            container.default_path_variable(),
            "/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin"
        );
        assert_eq!(
            container.join_path_variable(&["/a".to_string(), "/b".to_string()]),
            "/a:/b"
        );
        assert!(!container.is_environment_case_insensitive());
        assert_eq!(container.to_container_path("/home/me/repo"), "/home/me/repo");

        let ctx = container.runner_context();
        assert_eq!(ctx.os, "linux");
        assert_eq!(ctx.arch, "x64");
        assert_eq!(ctx.temp, "/tmp");
        assert_eq!(ctx.tool_cache, "/opt/hostedtoolcache");
        assert_eq!(ctx.workspace.as_deref(), Some("/github/workspace"));
        assert_eq!(ctx.action_path.as_deref(), Some("/github/workspace"));
    }

    #[tokio::test]
    #[serial]
    async fn health_is_unhealthy_and_sinks_come_back() {
        let container = null().await;
        assert_eq!(container.health().await, Health::Unhealthy);

        let out: LogWriter = Box::new(Vec::<u8>::new());
        let err: LogWriter = Box::new(std::io::sink());
        let (mut out, _err) = container.replace_log_writer(out, err);
        out.write_all(b"still usable").unwrap();
    }
}

mod override_control {
    use super::*;

    #[tokio::test]
    #[serial]
    async fn override_wins_until_cleared() {
        let factory = factory(FakeHost::new());

        set_runtime_override(RuntimeType::Podman);
        let res = factory.resolution().await;
        assert_eq!(res.runtime, RuntimeType::Podman);
        assert_eq!(res.source, ResolutionSource::Override);
        assert!(matches!(
            factory.new_container(input()).await,
            Container::Podman(_)
        ));

        clear_runtime_override();
        assert_eq!(runtime_override(), None);
        assert_eq!(factory.current_runtime().await, RuntimeType::Unknown);
    }

    #[tokio::test]
    #[serial]
    async fn guard_restores_previous_override() {
        set_runtime_override(RuntimeType::Docker);
        {
            let _guard = OverrideGuard::set(RuntimeType::Podman);
            assert_eq!(runtime_override(), Some(RuntimeType::Podman));
        }
        assert_eq!(runtime_override(), Some(RuntimeType::Docker));
        clear_runtime_override();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    #[serial]
    async fn concurrent_readers_see_only_written_values() {
        let _guard = OverrideGuard::set(RuntimeType::Docker);
        let factory = factory(FakeHost::new());
        let stop = Arc::new(AtomicBool::new(false));

        let writer = {
            let stop = Arc::clone(&stop);
            tokio::spawn(async move {
                let mut flip = false;
                while !stop.load(Ordering::Relaxed) {
                    let next = if flip { RuntimeType::Docker } else { RuntimeType::Podman };
                    set_runtime_override(next);
                    flip = !flip;
                    tokio::task::yield_now().await;
                }
            })
        };

        let readers: Vec<_> = (0..8)
            .map(|_| {
                let factory = factory.clone();
                tokio::spawn(async move {
                    for _ in 0..500 {
                        let runtime = factory.current_runtime().await;
                        assert!(
                            matches!(runtime, RuntimeType::Docker | RuntimeType::Podman),
                            "unexpected runtime {runtime}"
                        );
                    }
                })
            })
            .collect();

        for reader in readers {
            reader.await.unwrap();
        }
        stop.store(true, Ordering::Relaxed);
        writer.await.unwrap();
    }
}

// ABOUTME: Host probes used by runtime detection: binaries, sockets, pings, CLI queries.
// ABOUTME: The Prober trait lets detection run against a fake host in tests.

use super::candidates;
use super::connect::{self, ConnectError};
use super::types::RuntimeType;
use async_trait::async_trait;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Everything the detector needs to ask of the host.
///
/// Every async probe is bounded by `timeout` and aborts when `cancel` fires.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Whether the runtime's CLI binary is on `PATH`.
    fn binary_available(&self, runtime: RuntimeType) -> bool;

    /// Whether `path` exists as a socket or named pipe.
    fn socket_exists(&self, path: &str) -> bool;

    /// Connect to `uri` and ping the daemon.
    async fn ping(
        &self,
        uri: &str,
        runtime: RuntimeType,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<(), ConnectError>;

    /// Whether `podman info --format json` succeeds.
    async fn podman_info(&self, timeout: Duration, cancel: &CancellationToken) -> bool;

    /// Socket path reported by `podman machine inspect`, if any.
    async fn podman_machine_socket(
        &self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Option<String>;
}

/// Probes the real host.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProber;

#[async_trait]
impl Prober for SystemProber {
    fn binary_available(&self, runtime: RuntimeType) -> bool {
        match runtime.binary() {
            Some(name) => which::which(name).is_ok(),
            None => false,
        }
    }

    fn socket_exists(&self, path: &str) -> bool {
        candidates::socket_exists(path)
    }

    async fn ping(
        &self,
        uri: &str,
        runtime: RuntimeType,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<(), ConnectError> {
        let conn = connect::connect_and_ping(uri, runtime, timeout, cancel).await?;
        conn.close().await;
        Ok(())
    }

    async fn podman_info(&self, timeout: Duration, cancel: &CancellationToken) -> bool {
        match run_bounded("podman", &["info", "--format", "json"], timeout, cancel).await {
            Some(output) => output.status.success(),
            None => false,
        }
    }

    async fn podman_machine_socket(
        &self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Option<String> {
        let output = run_bounded(
            "podman",
            &[
                "machine",
                "inspect",
                "--format",
                "{{.ConnectionInfo.PodmanSocket.Path}}",
            ],
            timeout,
            cancel,
        )
        .await?;

        if !output.status.success() {
            tracing::debug!(
                status = ?output.status.code(),
                "podman machine inspect failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return None;
        }

        parse_machine_socket(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse `podman machine inspect` output into a socket path.
///
/// Multiple machines print one path per line; the first usable one wins.
pub(crate) fn parse_machine_socket(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && *line != "<no value>")
        .map(str::to_string)
}

/// Run a command with output captured, killed on timeout or cancellation.
async fn run_bounded(
    program: &str,
    args: &[&str],
    timeout: Duration,
    cancel: &CancellationToken,
) -> Option<Output> {
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output();

    tokio::select! {
        _ = cancel.cancelled() => {
            tracing::debug!(program, "probe cancelled");
            None
        }
        result = tokio::time::timeout(timeout, child) => match result {
            Ok(Ok(output)) => Some(output),
            Ok(Err(e)) => {
                tracing::debug!(program, "failed to run probe: {}", e);
                None
            }
            Err(_) => {
                tracing::debug!(program, ?timeout, "probe timed out");
                None
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn machine_socket_skips_placeholders() {
        assert_eq!(parse_machine_socket("<no value>\n"), None);
        assert_eq!(parse_machine_socket("\n  \n"), None);
        assert_eq!(
            parse_machine_socket("/Users/me/.local/share/containers/podman/machine/podman.sock\n"),
            Some("/Users/me/.local/share/containers/podman/machine/podman.sock".to_string())
        );
        assert_eq!(
            parse_machine_socket("<no value>\n/tmp/second.sock\n"),
            Some("/tmp/second.sock".to_string())
        );
    }

    #[test]
    fn unknown_runtime_has_no_binary() {
        assert!(!SystemProber.binary_available(RuntimeType::Unknown));
    }

    #[tokio::test]
    async fn cancelled_probe_returns_nothing() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let output = run_bounded("sleep", &["5"], Duration::from_secs(10), &cancel).await;
        assert!(output.is_none());
    }

    #[tokio::test]
    async fn slow_command_is_killed_at_timeout() {
        let cancel = CancellationToken::new();
        let start = std::time::Instant::now();
        let output = run_bounded("sleep", &["5"], Duration::from_millis(200), &cancel).await;
        assert!(output.is_none());
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn silent_socket_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("silent.sock");
        let listener = tokio::net::UnixListener::bind(&path).unwrap();
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        let uri = format!("unix://{}", path.display());
        let cancel = CancellationToken::new();
        let start = std::time::Instant::now();
        let result = SystemProber
            .ping(&uri, RuntimeType::Docker, Duration::from_millis(200), &cancel)
            .await;

        assert!(
            matches!(result, Err(ConnectError::Timeout { .. })),
            "expected timeout, got {:?}",
            result
        );
        assert!(start.elapsed() < Duration::from_secs(1));
        server.abort();
    }

    #[tokio::test]
    async fn missing_binary_is_not_an_error() {
        let cancel = CancellationToken::new();
        let output = run_bounded(
            "act-container-definitely-not-a-binary",
            &[],
            Duration::from_secs(1),
            &cancel,
        )
        .await;
        assert!(output.is_none());
    }
}

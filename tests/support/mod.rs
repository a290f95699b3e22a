// ABOUTME: Test support utilities.
// ABOUTME: Tracing setup and a scriptable fake host for deterministic detection.

use act_container::runtime::{ConnectError, ProbeSettings, Prober, RuntimeDetector, RuntimeType};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter =
            EnvFilter::from_default_env().add_directive("act_container=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// A host whose binaries, sockets and daemons are declared up front.
#[derive(Debug, Default)]
pub struct FakeHost {
    pub binaries: HashSet<RuntimeType>,
    /// Paths that exist.
    pub sockets: HashSet<String>,
    /// URIs whose daemon answers a ping.
    pub live: HashSet<String>,
    pub podman_info: bool,
    pub machine_socket: Option<String>,
    pub binary_checks: AtomicUsize,
}

#[allow(dead_code)]
impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn binary(mut self, runtime: RuntimeType) -> Self {
        self.binaries.insert(runtime);
        self
    }

    /// An existing socket at `path` with a daemon answering on it.
    pub fn daemon(mut self, path: &str) -> Self {
        self.sockets.insert(path.to_string());
        self.live.insert(format!("unix://{}", path));
        self
    }

    /// An existing socket at `path` that nobody answers on.
    pub fn dead_socket(mut self, path: &str) -> Self {
        self.sockets.insert(path.to_string());
        self
    }

    /// A daemon reachable at `uri` without any local socket file.
    pub fn live_uri(mut self, uri: &str) -> Self {
        self.live.insert(uri.to_string());
        self
    }

    pub fn podman_info(mut self, ok: bool) -> Self {
        self.podman_info = ok;
        self
    }

    pub fn machine_socket(mut self, path: &str) -> Self {
        self.machine_socket = Some(path.to_string());
        self
    }

    /// Both runtimes installed and running on their system sockets.
    pub fn both() -> Self {
        Self::new()
            .binary(RuntimeType::Docker)
            .binary(RuntimeType::Podman)
            .daemon("/var/run/docker.sock")
            .daemon("/run/podman/podman.sock")
    }

    pub fn docker_only() -> Self {
        Self::new()
            .binary(RuntimeType::Docker)
            .daemon("/var/run/docker.sock")
    }

    pub fn binary_checks(&self) -> usize {
        self.binary_checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Prober for FakeHost {
    fn binary_available(&self, runtime: RuntimeType) -> bool {
        self.binary_checks.fetch_add(1, Ordering::SeqCst);
        self.binaries.contains(&runtime)
    }

    fn socket_exists(&self, path: &str) -> bool {
        self.sockets.contains(path)
    }

    async fn ping(
        &self,
        uri: &str,
        _runtime: RuntimeType,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<(), ConnectError> {
        if cancel.is_cancelled() {
            return Err(ConnectError::Cancelled);
        }
        if self.live.contains(uri) {
            Ok(())
        } else {
            Err(ConnectError::Timeout {
                uri: uri.to_string(),
                timeout,
            })
        }
    }

    async fn podman_info(&self, _timeout: Duration, _cancel: &CancellationToken) -> bool {
        self.podman_info
    }

    async fn podman_machine_socket(
        &self,
        _timeout: Duration,
        _cancel: &CancellationToken,
    ) -> Option<String> {
        self.machine_socket.clone()
    }
}

/// Probe settings for tests: short bounds, no `podman machine` lookup.
#[allow(dead_code)]
pub fn test_settings() -> ProbeSettings {
    ProbeSettings {
        probe_timeout: Duration::from_millis(200),
        machine_timeout: Duration::from_millis(200),
        machine_lookup: false,
    }
}

/// A detector over `host` seeing only the variables in `env`.
#[allow(dead_code)]
pub fn detector(host: FakeHost, env: &[(&str, &str)]) -> RuntimeDetector {
    detector_with(Arc::new(host), env)
}

#[allow(dead_code)]
pub fn detector_with(host: Arc<FakeHost>, env: &[(&str, &str)]) -> RuntimeDetector {
    let vars: HashMap<String, String> = env
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    RuntimeDetector::new()
        .with_prober(host)
        .with_env(Arc::new(move |name: &str| vars.get(name).cloned()))
        .with_probe_settings(test_settings())
}

// ABOUTME: Runtime detection: preference, environment hints, then live socket probing.
// ABOUTME: Also produces socket locations and the diagnostic report for missing runtimes.

use super::candidates::{self, default_candidates, existing_candidates};
use super::probe::{Prober, SystemProber};
use super::types::{
    DetectorConfig, ProbeSettings, Resolution, ResolutionSource, ResolvedSocket, RuntimeType,
    SocketCandidate, socket_uri,
};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Preferred runtime (`docker` or `podman`).
pub const ENV_RUNTIME: &str = "ACT_CONTAINER_RUNTIME";
/// Custom socket override.
pub const ENV_SOCKET: &str = "ACT_CONTAINER_SOCKET";
pub const ENV_PODMAN_HOST: &str = "PODMAN_HOST";
pub const ENV_DOCKER_HOST: &str = "DOCKER_HOST";

const DOCKER_INSTALL_URL: &str = "https://docs.docker.com/get-docker/";
const PODMAN_INSTALL_URL: &str = "https://podman.io/getting-started/installation";

/// Environment lookup. Returns `None` for unset variables.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Read environment hints in priority order.
///
/// `ACT_CONTAINER_RUNTIME` names a runtime (case-insensitive); any other value
/// is ignored. `PODMAN_HOST` then `DOCKER_HOST` hint by presence.
pub fn check_environment_hints<F>(lookup: F) -> RuntimeType
where
    F: Fn(&str) -> Option<String>,
{
    let set = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(value) = set(ENV_RUNTIME) {
        match value.to_ascii_lowercase().as_str() {
            "docker" => return RuntimeType::Docker,
            "podman" => return RuntimeType::Podman,
            _ => {}
        }
    }

    if set(ENV_PODMAN_HOST).is_some() {
        return RuntimeType::Podman;
    }

    if set(ENV_DOCKER_HOST).is_some() {
        return RuntimeType::Docker;
    }

    RuntimeType::Unknown
}

/// Configuration after `ACT_CONTAINER_*` filled any unset fields.
struct Effective {
    config: DetectorConfig,
    preferred_source: ResolutionSource,
}

struct CacheEntry {
    config: DetectorConfig,
    runtime: RuntimeType,
    at: Instant,
}

/// Resolves which container runtime to use.
///
/// Each [`detect`](Self::detect) call re-runs resolution unless a cache TTL is
/// configured. Configuration setters invalidate the cache.
pub struct RuntimeDetector {
    config: RwLock<DetectorConfig>,
    settings: ProbeSettings,
    candidates: Vec<SocketCandidate>,
    prober: Arc<dyn Prober>,
    env: EnvLookup,
    cancel: CancellationToken,
    cache: Mutex<Option<CacheEntry>>,
}

impl fmt::Debug for RuntimeDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeDetector")
            .field("config", &*self.config.read())
            .field("settings", &self.settings)
            .field("candidates", &self.candidates.len())
            .finish()
    }
}

impl Default for RuntimeDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeDetector {
    /// A detector probing the real host with the default candidate table.
    pub fn new() -> Self {
        Self {
            config: RwLock::new(DetectorConfig::default()),
            settings: ProbeSettings::default(),
            candidates: default_candidates(),
            prober: Arc::new(SystemProber),
            env: Arc::new(candidates::process_env),
            cancel: CancellationToken::new(),
            cache: Mutex::new(None),
        }
    }

    /// The lazily created process-wide detector.
    pub fn global() -> Arc<RuntimeDetector> {
        static GLOBAL: OnceLock<Arc<RuntimeDetector>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(RuntimeDetector::new())))
    }

    pub fn with_prober(mut self, prober: Arc<dyn Prober>) -> Self {
        self.prober = prober;
        self
    }

    pub fn with_env(mut self, env: EnvLookup) -> Self {
        self.env = env;
        self
    }

    pub fn with_candidates(mut self, candidates: Vec<SocketCandidate>) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn with_probe_settings(mut self, settings: ProbeSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_config(self, config: DetectorConfig) -> Self {
        *self.config.write() = config;
        self
    }

    /// Use `token` to abort in-flight probes.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn probe_settings(&self) -> ProbeSettings {
        self.settings
    }

    /// Snapshot of the explicit configuration.
    pub fn config(&self) -> DetectorConfig {
        self.config.read().clone()
    }

    pub fn configure(&self, config: DetectorConfig) {
        *self.config.write() = config;
        self.invalidate_cache();
    }

    pub fn set_preferred_runtime(&self, runtime: RuntimeType) {
        self.config.write().preferred = runtime;
        self.invalidate_cache();
        tracing::debug!(component = "runtime-detector", runtime = %runtime, "preferred runtime set");
    }

    pub fn set_custom_socket(&self, socket: Option<String>) {
        let socket = socket.filter(|s| !s.is_empty());
        tracing::debug!(component = "runtime-detector", socket = ?socket, "custom socket set");
        self.config.write().custom_socket = socket;
        self.invalidate_cache();
    }

    pub fn set_cache_ttl(&self, ttl: Option<std::time::Duration>) {
        self.config.write().cache_ttl = ttl;
        self.invalidate_cache();
    }

    pub fn invalidate_cache(&self) {
        *self.cache.lock() = None;
    }

    /// Non-empty value of `name` from this detector's environment.
    pub(crate) fn env_var(&self, name: &str) -> Option<String> {
        (self.env)(name).filter(|v| !v.is_empty())
    }

    fn effective(&self) -> Effective {
        let mut config = self.config();
        let mut preferred_source = ResolutionSource::Preferred;

        if !config.preferred.is_known()
            && let Some(value) = self.env_var(ENV_RUNTIME)
        {
            match value.parse::<RuntimeType>() {
                Ok(runtime) if runtime.is_known() => {
                    config.preferred = runtime;
                    preferred_source = ResolutionSource::Environment;
                }
                _ => tracing::debug!(
                    component = "runtime-detector",
                    "ignoring {}={}",
                    ENV_RUNTIME,
                    value
                ),
            }
        }

        if config.custom_socket.is_none() {
            config.custom_socket = self.env_var(ENV_SOCKET);
        }

        Effective {
            config,
            preferred_source,
        }
    }

    /// Runtime to use, or `Unknown` when nothing is usable.
    pub async fn detect_available_runtime(&self) -> RuntimeType {
        self.detect().await.runtime
    }

    /// Resolve the runtime, recording which phase produced it.
    pub async fn detect(&self) -> Resolution {
        let effective = self.effective();

        if let Some(runtime) = self.cached(&effective.config) {
            tracing::debug!(component = "runtime-detector", runtime = %runtime, "using cached runtime");
            return Resolution::new(runtime, ResolutionSource::Cached);
        }

        let resolution = self.resolve(&effective).await;

        if resolution.runtime.is_known() && effective.config.cache_ttl.is_some() {
            *self.cache.lock() = Some(CacheEntry {
                config: effective.config,
                runtime: resolution.runtime,
                at: Instant::now(),
            });
        }

        resolution
    }

    fn cached(&self, config: &DetectorConfig) -> Option<RuntimeType> {
        let ttl = config.cache_ttl?;
        let cache = self.cache.lock();
        let entry = cache.as_ref()?;
        (entry.config == *config && entry.at.elapsed() < ttl).then_some(entry.runtime)
    }

    async fn resolve(&self, effective: &Effective) -> Resolution {
        tracing::debug!(component = "runtime-detector", "starting container runtime detection");
        let config = &effective.config;

        let preferred = config.preferred;
        if preferred.is_known() {
            if self.verify_runtime(preferred).await {
                tracing::info!(component = "runtime-detector", runtime = %preferred, "using preferred runtime");
                return Resolution::new(preferred, effective.preferred_source);
            }
            tracing::warn!(
                component = "runtime-detector",
                runtime = %preferred,
                "preferred runtime is not available, falling back to auto-detection"
            );
        }

        let hinted = check_environment_hints(|name| (self.env)(name));
        if hinted.is_known() && hinted != preferred {
            if self.verify_runtime(hinted).await {
                tracing::info!(component = "runtime-detector", runtime = %hinted, "using runtime from environment");
                return Resolution::new(hinted, ResolutionSource::Environment);
            }
            tracing::warn!(
                component = "runtime-detector",
                runtime = %hinted,
                "environment-specified runtime is not available"
            );
        }

        if let Some(socket) = self.resolve_socket(config).await {
            tracing::info!(
                component = "runtime-detector",
                runtime = %socket.runtime,
                socket = %socket.uri,
                "auto-detected runtime"
            );
            return Resolution::new(socket.runtime, ResolutionSource::AutoDetected);
        }

        tracing::error!(component = "runtime-detector", "no container runtime detected");
        Resolution::none()
    }

    /// Check that a runtime's binary exists and its service answers.
    pub async fn verify_runtime(&self, runtime: RuntimeType) -> bool {
        match runtime {
            RuntimeType::Docker => self.verify_docker().await,
            RuntimeType::Podman => self.verify_podman().await,
            _ => false,
        }
    }

    async fn verify_docker(&self) -> bool {
        if !self.prober.binary_available(RuntimeType::Docker) {
            tracing::debug!(component = "runtime-detector", "docker binary not found in PATH");
            return false;
        }

        match self.docker_socket_location() {
            Some(uri) => self.ping(&uri, RuntimeType::Docker).await,
            None => {
                tracing::debug!(component = "runtime-detector", "no docker socket found");
                false
            }
        }
    }

    async fn verify_podman(&self) -> bool {
        if !self.prober.binary_available(RuntimeType::Podman) {
            tracing::debug!(component = "runtime-detector", "podman binary not found in PATH");
            return false;
        }

        if let Some(uri) = self.podman_socket_location().await
            && self.ping(&uri, RuntimeType::Podman).await
        {
            return true;
        }

        let ok = self
            .prober
            .podman_info(self.settings.probe_timeout, &self.cancel)
            .await;
        if !ok {
            tracing::debug!(component = "runtime-detector", "podman info failed");
        }
        ok
    }

    async fn ping(&self, uri: &str, runtime: RuntimeType) -> bool {
        match self
            .prober
            .ping(uri, runtime, self.settings.probe_timeout, &self.cancel)
            .await
        {
            Ok(()) => {
                tracing::debug!(component = "runtime-detector", runtime = %runtime, socket = uri, "verified runtime socket");
                true
            }
            Err(e) => {
                tracing::debug!(component = "runtime-detector", runtime = %runtime, socket = uri, "probe failed: {}", e);
                false
            }
        }
    }

    /// Where the Docker CLI would connect: `DOCKER_HOST`, else the first
    /// existing Docker socket in the table. Not pinged.
    pub fn docker_socket_location(&self) -> Option<String> {
        if let Some(host) = self.env_var(ENV_DOCKER_HOST) {
            return Some(host);
        }
        self.existing(RuntimeType::Docker).first().map(SocketCandidate::uri)
    }

    async fn podman_socket_location(&self) -> Option<String> {
        if let Some(host) = self.env_var(ENV_PODMAN_HOST) {
            return Some(host);
        }
        if let Some(uri) = self.machine_socket().await {
            return Some(uri);
        }
        self.existing(RuntimeType::Podman).first().map(SocketCandidate::uri)
    }

    async fn machine_socket(&self) -> Option<String> {
        if !self.settings.machine_lookup {
            return None;
        }
        let path = self
            .prober
            .podman_machine_socket(self.settings.machine_timeout, &self.cancel)
            .await?;
        if !self.prober.socket_exists(&path) {
            tracing::debug!(component = "runtime-detector", socket = %path, "podman machine socket not accessible");
            return None;
        }
        tracing::debug!(component = "runtime-detector", socket = %path, "found podman machine socket");
        Some(socket_uri(&path))
    }

    fn existing(&self, runtime: RuntimeType) -> Vec<SocketCandidate> {
        let table: Vec<SocketCandidate> = self
            .candidates
            .iter()
            .filter(|c| c.runtime == runtime)
            .cloned()
            .collect();
        existing_candidates(&table, |name| (self.env)(name), |path| {
            self.prober.socket_exists(path)
        })
    }

    /// Sockets worth probing, highest score first.
    ///
    /// A custom socket replaces the table and is not checked for existence.
    pub fn discover_sockets(&self) -> Vec<SocketCandidate> {
        let config = self.effective().config;
        self.discover_with(&config)
    }

    fn discover_with(&self, config: &DetectorConfig) -> Vec<SocketCandidate> {
        if let Some(socket) = &config.custom_socket {
            return vec![SocketCandidate::new(
                socket.clone(),
                RuntimeType::guess_from_socket(socket),
                100,
            )];
        }
        existing_candidates(&self.candidates, |name| (self.env)(name), |path| {
            self.prober.socket_exists(path)
        })
    }

    async fn resolve_socket(&self, config: &DetectorConfig) -> Option<ResolvedSocket> {
        for candidate in self.discover_with(config) {
            let uri = candidate.uri();
            if self.ping(&uri, candidate.runtime).await {
                return Some(ResolvedSocket {
                    uri,
                    runtime: candidate.runtime,
                });
            }
        }
        None
    }

    /// Connection URI for `runtime`, or `None` if no socket is usable.
    pub async fn socket_for_runtime(&self, runtime: RuntimeType) -> Option<String> {
        let config = self.effective().config;

        if let Some(socket) = &config.custom_socket {
            return Some(socket_uri(socket));
        }

        if runtime == RuntimeType::Podman {
            if let Some(host) = self.env_var(ENV_PODMAN_HOST) {
                return Some(host);
            }
            if let Some(uri) = self.machine_socket().await {
                return Some(uri);
            }
        }

        for candidate in self.existing(runtime) {
            let uri = candidate.uri();
            if self.ping(&uri, runtime).await {
                return Some(uri);
            }
        }
        None
    }

    /// Every concrete runtime that currently verifies.
    pub async fn available_runtimes(&self) -> Vec<RuntimeType> {
        let checks = RuntimeType::CONCRETE.map(|rt| async move { (rt, self.verify_runtime(rt).await) });
        futures::future::join_all(checks)
            .await
            .into_iter()
            .filter_map(|(rt, ok)| ok.then_some(rt))
            .collect()
    }

    /// Live status of each runtime, for the diagnostic report.
    pub async fn detection_status(&self) -> DetectionStatus {
        let (docker_available, podman_available) = tokio::join!(
            self.verify_runtime(RuntimeType::Docker),
            self.verify_runtime(RuntimeType::Podman)
        );
        DetectionStatus {
            docker_socket: self.docker_socket_location(),
            docker_available,
            podman_available,
        }
    }

    /// Actionable explanation of why no runtime is usable.
    pub async fn diagnostic_report(&self) -> String {
        self.detection_status().await.to_string()
    }
}

/// Snapshot of what detection could see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetectionStatus {
    pub docker_socket: Option<String>,
    pub docker_available: bool,
    pub podman_available: bool,
}

impl fmt::Display for DetectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = |ok: bool| if ok { "✓" } else { "✗" };

        writeln!(f, "No container runtime detected")?;
        writeln!(f)?;
        writeln!(f, "Running workflow steps in containers requires either Docker or Podman.")?;
        writeln!(f)?;
        writeln!(f, "Install options:")?;
        writeln!(f, "  Docker:  {}", DOCKER_INSTALL_URL)?;
        writeln!(f, "  Podman:  {}", PODMAN_INSTALL_URL)?;
        writeln!(f)?;
        writeln!(f, "Current detection status:")?;
        match &self.docker_socket {
            Some(socket) => writeln!(f, "  {} Docker (socket: {})", mark(self.docker_available), socket)?,
            None => writeln!(f, "  ✗ Docker daemon not running (no socket found)")?,
        }
        writeln!(f, "  {} Podman (binary check)", mark(self.podman_available))?;
        writeln!(f)?;
        writeln!(f, "Override detection with:")?;
        writeln!(f, "  act-container --container-runtime=docker")?;
        writeln!(f, "  act-container --container-runtime=podman")?;
        writeln!(f, "  act-container --container-socket=/custom/socket")?;
        write!(f, "  {}=docker|podman, {}=/custom/socket", ENV_RUNTIME, ENV_SOCKET)
    }
}

// ABOUTME: Runtime identity and detection data types.
// ABOUTME: RuntimeType, socket candidates, resolved sockets, and detector config.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// The container runtime backing an execution environment.
///
/// `Unknown` means "no preference" in configuration and "nothing usable" as a
/// detection result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum RuntimeType {
    #[default]
    Unknown,
    Docker,
    Podman,
}

impl RuntimeType {
    /// Runtimes that can actually back a container, in reporting order.
    pub const CONCRETE: [RuntimeType; 2] = [RuntimeType::Docker, RuntimeType::Podman];

    /// Canonical lowercase name used in logs, env vars and error text.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeType::Unknown => "unknown",
            RuntimeType::Docker => "docker",
            RuntimeType::Podman => "podman",
        }
    }

    /// Name of the command-line binary for this runtime.
    pub fn binary(&self) -> Option<&'static str> {
        match self {
            RuntimeType::Unknown => None,
            RuntimeType::Docker => Some("docker"),
            RuntimeType::Podman => Some("podman"),
        }
    }

    pub fn is_known(&self) -> bool {
        *self != RuntimeType::Unknown
    }

    /// Guess the runtime serving a socket path from its name.
    ///
    /// Unrecognized paths are assumed to speak the Docker API.
    pub fn guess_from_socket(socket: &str) -> RuntimeType {
        let lower = socket.to_lowercase();
        if lower.contains("podman") {
            RuntimeType::Podman
        } else {
            RuntimeType::Docker
        }
    }
}

impl std::fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a runtime name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown container runtime '{0}' (expected docker or podman)")]
pub struct ParseRuntimeError(pub String);

impl FromStr for RuntimeType {
    type Err = ParseRuntimeError;

    /// Case-insensitive. `auto` and the empty string mean no preference.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "docker" => Ok(RuntimeType::Docker),
            "podman" => Ok(RuntimeType::Podman),
            "" | "auto" | "unknown" => Ok(RuntimeType::Unknown),
            _ => Err(ParseRuntimeError(s.to_string())),
        }
    }
}

/// A conventional socket or named-pipe location for a runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketCandidate {
    /// Path, possibly containing `$VAR` or `${VAR}` placeholders.
    pub path: String,
    pub runtime: RuntimeType,
    /// Selection priority, higher wins.
    pub score: i32,
}

impl SocketCandidate {
    pub fn new(path: impl Into<String>, runtime: RuntimeType, score: i32) -> Self {
        Self {
            path: path.into(),
            runtime,
            score,
        }
    }

    /// Connection URI for an already-expanded candidate path.
    pub fn uri(&self) -> String {
        socket_uri(&self.path)
    }
}

/// A socket that exists and answered a ping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSocket {
    /// Normalized as `unix://…`, `npipe://…`, or the original scheme.
    pub uri: String,
    pub runtime: RuntimeType,
}

/// Normalize a socket path into a connection URI.
///
/// Paths that already carry a scheme are returned unchanged; Windows pipe
/// paths become `npipe://` with forward slashes.
pub fn socket_uri(path: &str) -> String {
    if path.contains("://") {
        path.to_string()
    } else if path.starts_with(r"\\.\") {
        format!("npipe://{}", path.replace('\\', "/"))
    } else {
        format!("unix://{}", path)
    }
}

/// Where a resolution result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionSource {
    /// The process-wide test override.
    Override,
    /// The configured preferred runtime.
    Preferred,
    /// `ACT_CONTAINER_RUNTIME`, `PODMAN_HOST` or `DOCKER_HOST`.
    Environment,
    /// Live probing of the socket candidate table.
    AutoDetected,
    /// A previous verified resolution still inside the cache window.
    Cached,
    /// Nothing usable was found.
    None,
}

impl ResolutionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionSource::Override => "override",
            ResolutionSource::Preferred => "preferred",
            ResolutionSource::Environment => "environment",
            ResolutionSource::AutoDetected => "auto-detected",
            ResolutionSource::Cached => "cached",
            ResolutionSource::None => "none",
        }
    }
}

impl std::fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one resolution pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub runtime: RuntimeType,
    pub source: ResolutionSource,
}

impl Resolution {
    pub fn new(runtime: RuntimeType, source: ResolutionSource) -> Self {
        Self { runtime, source }
    }

    pub fn none() -> Self {
        Self::new(RuntimeType::Unknown, ResolutionSource::None)
    }
}

/// Mutable detection settings owned by one detector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectorConfig {
    /// Runtime to try first. `Unknown` means no preference.
    pub preferred: RuntimeType,
    /// Socket that replaces the candidate table entirely.
    pub custom_socket: Option<String>,
    /// How long a verified resolution may be reused. `None` disables caching.
    pub cache_ttl: Option<Duration>,
}

/// Timeouts for live probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSettings {
    /// Bound for a socket dial plus ping, and for `podman info`.
    pub probe_timeout: Duration,
    /// Bound for `podman machine inspect`.
    pub machine_timeout: Duration,
    /// Whether to ask `podman machine` for its forwarded API socket.
    pub machine_lookup: bool,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(5),
            machine_timeout: Duration::from_secs(3),
            machine_lookup: cfg!(target_os = "macos"),
        }
    }
}

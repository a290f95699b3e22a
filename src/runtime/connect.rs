// ABOUTME: Docker-API client construction for runtime socket URIs.
// ABOUTME: Handles unix://, npipe://, tcp://, and ssh:// (tunnelled) endpoints.

use super::types::RuntimeType;
use crate::ssh::{self, SshTarget, SshTunnel};
use bollard::Docker;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Request timeout handed to bollard, in seconds.
const CLIENT_TIMEOUT_SECS: u64 = 120;

const DEFAULT_REMOTE_DOCKER_SOCKET: &str = "/var/run/docker.sock";
const DEFAULT_REMOTE_PODMAN_SOCKET: &str = "/run/podman/podman.sock";

/// Failure to reach a runtime endpoint.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("{0} socket not found or not accessible")]
    SocketNotFound(RuntimeType),

    #[error("failed to create client for {uri}: {source}")]
    Client {
        uri: String,
        #[source]
        source: bollard::errors::Error,
    },

    #[error("failed to ping daemon at {uri}: {source}")]
    Ping {
        uri: String,
        #[source]
        source: bollard::errors::Error,
    },

    #[error("timed out after {timeout:?} waiting for {uri}")]
    Timeout { uri: String, timeout: Duration },

    #[error("probe cancelled")]
    Cancelled,

    #[error("failed to create SSH connection helper: {0}")]
    Ssh(#[from] ssh::Error),
}

/// An open client to a runtime, plus the SSH tunnel keeping it reachable.
#[derive(Debug)]
pub struct Connection {
    client: Docker,
    uri: String,
    tunnel: Option<SshTunnel>,
}

impl Connection {
    pub fn client(&self) -> &Docker {
        &self.client
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn is_tunnelled(&self) -> bool {
        self.tunnel.is_some()
    }

    /// Local Unix socket path when the endpoint is a plain unix socket.
    pub fn unix_socket_path(&self) -> Option<&str> {
        if self.tunnel.is_some() {
            return None;
        }
        self.uri.strip_prefix("unix://")
    }

    /// Ping the daemon within `timeout`.
    pub async fn ping(&self, timeout: Duration) -> Result<(), ConnectError> {
        match tokio::time::timeout(timeout, self.client.ping()).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(source)) => Err(ConnectError::Ping {
                uri: self.uri.clone(),
                source,
            }),
            Err(_) => Err(ConnectError::Timeout {
                uri: self.uri.clone(),
                timeout,
            }),
        }
    }

    /// Release the client and tear down any tunnel.
    pub async fn close(self) {
        if let Some(tunnel) = self.tunnel
            && let Err(e) = tunnel.close().await
        {
            tracing::debug!(uri = %self.uri, "ssh tunnel close failed: {}", e);
        }
    }
}

/// Open a client for `uri`, tunnelling `ssh://` endpoints.
///
/// `runtime` picks the default remote socket when an `ssh://` URI has no path.
pub async fn connect(uri: &str, runtime: RuntimeType) -> Result<Connection, ConnectError> {
    if uri.starts_with("ssh://") {
        let target = SshTarget::parse(uri)?;
        let remote = target.socket_path.clone().unwrap_or_else(|| {
            match runtime {
                RuntimeType::Podman => DEFAULT_REMOTE_PODMAN_SOCKET,
                _ => DEFAULT_REMOTE_DOCKER_SOCKET,
            }
            .to_string()
        });
        let tunnel = SshTunnel::open(&target, &remote).await?;
        let local = tunnel.local_socket().to_string_lossy().into_owned();
        let client = Docker::connect_with_unix(&local, CLIENT_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION)
            .map_err(|source| ConnectError::Client {
                uri: uri.to_string(),
                source,
            })?;
        return Ok(Connection {
            client,
            uri: uri.to_string(),
            tunnel: Some(tunnel),
        });
    }

    let client = client_for(uri).map_err(|source| ConnectError::Client {
        uri: uri.to_string(),
        source,
    })?;

    Ok(Connection {
        client,
        uri: uri.to_string(),
        tunnel: None,
    })
}

/// Open a client and ping it, bounded by `timeout` and `cancel`.
pub async fn connect_and_ping(
    uri: &str,
    runtime: RuntimeType,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<Connection, ConnectError> {
    let attempt = async {
        let conn = connect(uri, runtime).await?;
        conn.ping(timeout).await?;
        Ok(conn)
    };

    tokio::select! {
        _ = cancel.cancelled() => Err(ConnectError::Cancelled),
        result = tokio::time::timeout(timeout, attempt) => match result {
            Ok(result) => result,
            Err(_) => Err(ConnectError::Timeout { uri: uri.to_string(), timeout }),
        },
    }
}

/// A client configured the way bollard itself reads `DOCKER_HOST`.
pub fn connect_with_defaults(host: &str) -> Result<Connection, ConnectError> {
    let client = Docker::connect_with_defaults().map_err(|source| ConnectError::Client {
        uri: host.to_string(),
        source,
    })?;
    Ok(Connection {
        client,
        uri: host.to_string(),
        tunnel: None,
    })
}

fn client_for(uri: &str) -> Result<Docker, bollard::errors::Error> {
    if let Some(path) = uri.strip_prefix("unix://") {
        return Docker::connect_with_unix(path, CLIENT_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION);
    }
    if uri.starts_with("tcp://") || uri.starts_with("http://") {
        return Docker::connect_with_http(uri, CLIENT_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION);
    }
    if uri.starts_with("npipe://") {
        return connect_named_pipe(uri);
    }
    Docker::connect_with_unix(uri, CLIENT_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION)
}

#[cfg(windows)]
fn connect_named_pipe(uri: &str) -> Result<Docker, bollard::errors::Error> {
    Docker::connect_with_named_pipe(uri, CLIENT_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION)
}

#[cfg(not(windows))]
fn connect_named_pipe(_uri: &str) -> Result<Docker, bollard::errors::Error> {
    Err(bollard::errors::Error::UnsupportedURISchemeError {
        uri: "npipe".to_string(),
    })
}

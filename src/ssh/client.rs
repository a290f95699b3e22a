// ABOUTME: SSH tunnel setup using russh.
// ABOUTME: Connects, authenticates via agent or default keys, forwards a remote socket.

use super::error::{Error, Result};
use super::forward::{self, ForwardHandle};
use super::target::SshTarget;
use russh::client::{self, Config, Handle};
use russh::keys::agent::client::AgentClient;
use russh::keys::known_hosts::check_known_hosts;
use russh::keys::{PrivateKeyWithHashAlg, load_secret_key, ssh_key};
use russh::Disconnect;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UnixStream;

/// russh handler that only accepts hosts already in `~/.ssh/known_hosts`.
pub(crate) struct TunnelHandler {
    host: String,
    port: u16,
}

impl client::Handler for TunnelHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &ssh_key::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        match check_known_hosts(&self.host, self.port, server_public_key) {
            Ok(known) => {
                if !known {
                    tracing::warn!(host = %self.host, port = self.port, "host key not in known_hosts");
                }
                Ok(known)
            }
            Err(e) => {
                tracing::warn!(host = %self.host, port = self.port, "host key check failed: {}", e);
                Ok(false)
            }
        }
    }
}

enum Credentials {
    Agent(AgentClient<UnixStream>),
    Key(Arc<ssh_key::PrivateKey>),
}

/// A live SSH connection forwarding one remote runtime socket locally.
///
/// Dropping the tunnel stops the forwarder; call [`SshTunnel::close`] to
/// also disconnect cleanly.
pub struct SshTunnel {
    target: SshTarget,
    handle: Arc<Handle<TunnelHandler>>,
    forward: ForwardHandle,
}

impl std::fmt::Debug for SshTunnel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshTunnel")
            .field("target", &self.target)
            .field("local_socket", &self.forward.local_path)
            .finish()
    }
}

impl SshTunnel {
    /// Open a tunnel to `remote_socket` on `target`.
    pub async fn open(target: &SshTarget, remote_socket: &str) -> Result<Self> {
        let credentials = resolve_credentials().await?;

        let config = Config {
            inactivity_timeout: Some(Duration::from_secs(60)),
            ..Default::default()
        };
        let handler = TunnelHandler {
            host: target.host.clone(),
            port: target.port,
        };

        let mut session = client::connect(
            Arc::new(config),
            (target.host.as_str(), target.port),
            handler,
        )
        .await
        .map_err(|e| match e {
            russh::Error::UnknownKey => Error::UnknownHost {
                host: target.host.clone(),
                port: target.port,
            },
            other => Error::Connection(format!("{}:{}: {}", target.host, target.port, other)),
        })?;

        if !authenticate(&mut session, &target.user, credentials).await? {
            return Err(Error::AuthenticationFailed {
                user: target.user.clone(),
                host: target.host.clone(),
            });
        }

        let handle = Arc::new(session);
        let forward = forward::start_forward(Arc::clone(&handle), remote_socket.to_string())?;

        tracing::debug!(
            host = %target.host,
            remote = remote_socket,
            local = %forward.local_path.display(),
            "ssh tunnel established"
        );

        Ok(Self {
            target: target.clone(),
            handle,
            forward,
        })
    }

    /// Local Unix socket that reaches the remote runtime.
    pub fn local_socket(&self) -> &Path {
        &self.forward.local_path
    }

    pub fn target(&self) -> &SshTarget {
        &self.target
    }

    /// Stop forwarding and disconnect the session.
    pub async fn close(self) -> Result<()> {
        self.forward.stop().await;
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
            .map_err(Error::Protocol)
    }
}

/// Prefer the SSH agent, then the usual key files in `~/.ssh`.
async fn resolve_credentials() -> Result<Credentials> {
    if let Ok(agent) = AgentClient::connect_env().await {
        return Ok(Credentials::Agent(agent));
    }

    let ssh_dir = dirs::home_dir()
        .ok_or_else(|| {
            Error::AgentUnavailable("SSH agent not available and no home directory".to_string())
        })?
        .join(".ssh");

    let mut last_error = None;
    for name in ["id_ed25519", "id_ecdsa", "id_rsa"] {
        let path = ssh_dir.join(name);
        if !path.exists() {
            continue;
        }
        match load_secret_key(&path, None) {
            Ok(key) => return Ok(Credentials::Key(Arc::new(key))),
            Err(e) => {
                last_error = Some(Error::KeyLoadFailed {
                    path,
                    reason: e.to_string(),
                })
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        Error::AgentUnavailable("SSH agent not available and no default keys found".to_string())
    }))
}

async fn authenticate(
    session: &mut Handle<TunnelHandler>,
    user: &str,
    credentials: Credentials,
) -> Result<bool> {
    match credentials {
        Credentials::Agent(mut agent) => {
            let identities = agent
                .request_identities()
                .await
                .map_err(|e| Error::AgentUnavailable(format!("failed to list agent keys: {}", e)))?;

            for key in identities {
                match session
                    .authenticate_publickey_with(user, key, None, &mut agent)
                    .await
                {
                    Ok(result) if result.success() => return Ok(true),
                    _ => continue,
                }
            }
            Ok(false)
        }
        Credentials::Key(key) => {
            let hash_alg = session
                .best_supported_rsa_hash()
                .await
                .map_err(Error::Protocol)?
                .flatten();
            let result = session
                .authenticate_publickey(user, PrivateKeyWithHashAlg::new(key, hash_alg))
                .await
                .map_err(Error::Protocol)?;
            Ok(result.success())
        }
    }
}

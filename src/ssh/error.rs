// ABOUTME: SSH tunnel error types.
// ABOUTME: Covers URI parsing, connection, authentication, and forwarding failures.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid ssh URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("host key for {host}:{port} is not in known_hosts (connect once with ssh to add it)")]
    UnknownHost { host: String, port: u16 },

    #[error("authentication failed for {user}@{host}")]
    AuthenticationFailed { user: String, host: String },

    #[error("SSH agent not available: {0}")]
    AgentUnavailable(String),

    #[error("failed to load key from {path}: {reason}")]
    KeyLoadFailed { path: PathBuf, reason: String },

    #[error("socket forwarding failed: {0}")]
    SocketForwardFailed(String),

    #[error("SSH protocol error: {0}")]
    Protocol(#[from] russh::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

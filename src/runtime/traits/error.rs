// ABOUTME: Error type shared by every execution-environment operation.
// ABOUTME: Classifies failures into RuntimeErrorKind for callers.

use crate::runtime::connect::ConnectError;
use crate::runtime::error::RuntimeErrorKind;
use crate::runtime::types::RuntimeType;

/// Errors from container operations.
#[derive(Debug, thiserror::Error)]
pub enum EnvironmentError {
    #[error("no container runtime available\n\n{report}")]
    Unavailable { report: String },

    #[error("container runtime {runtime} was requested but is not available\n\n{report}")]
    ForcedUnavailable { runtime: RuntimeType, report: String },

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("container has not been created")]
    NotCreated,

    #[error("exit with `FAILURE`: {0}")]
    ExitCode(i64),

    #[error("podman container creation failed: {message}\nHint: {hint}")]
    Podman { message: String, hint: String },

    #[error("invalid env file {path}: {reason}")]
    EnvFile { path: String, reason: String },

    #[error("archive error: {0}")]
    Archive(String),

    #[error("runtime error: {0}")]
    Runtime(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EnvironmentError {
    pub fn kind(&self) -> RuntimeErrorKind {
        match self {
            EnvironmentError::Unavailable { .. } => RuntimeErrorKind::Unavailable,
            EnvironmentError::ForcedUnavailable { .. } => RuntimeErrorKind::ForcedUnavailable,
            EnvironmentError::Connect(_) => RuntimeErrorKind::ConnectionFailed,
            EnvironmentError::Podman { .. } => RuntimeErrorKind::BackendSpecific,
            _ => RuntimeErrorKind::Operation,
        }
    }
}

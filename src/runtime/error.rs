// ABOUTME: Runtime error types with SNAFU pattern.
// ABOUTME: Unifies environment and connection errors for programmatic handling.

use snafu::Snafu;

use super::connect::ConnectError;
use super::traits::EnvironmentError;

/// Unified runtime error for resolution, connection and adapter failures.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RuntimeError {
    #[snafu(display("{source}"))]
    Environment { source: EnvironmentError },

    #[snafu(display("runtime connection failed: {source}"))]
    Connection { source: ConnectError },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum RuntimeErrorKind {
    /// No runtime could be resolved.
    Unavailable,
    /// The caller forced a runtime that failed verification.
    ForcedUnavailable,
    /// A socket could not be reached or pinged.
    ConnectionFailed,
    /// A backend error rewrapped with a backend-specific hint.
    BackendSpecific,
    /// Any other failed container operation.
    Operation,
}

impl RuntimeError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> RuntimeErrorKind {
        match self {
            RuntimeError::Environment { source } => source.kind(),
            RuntimeError::Connection { .. } => RuntimeErrorKind::ConnectionFailed,
        }
    }

    /// Returns the connection error if this is a connection failure.
    pub fn connection_details(&self) -> Option<&ConnectError> {
        match self {
            RuntimeError::Connection { source } => Some(source),
            RuntimeError::Environment {
                source: EnvironmentError::Connect(source),
            } => Some(source),
            _ => None,
        }
    }
}

impl From<EnvironmentError> for RuntimeError {
    fn from(source: EnvironmentError) -> Self {
        RuntimeError::Environment { source }
    }
}

impl From<ConnectError> for RuntimeError {
    fn from(source: ConnectError) -> Self {
        RuntimeError::Connection { source }
    }
}

// ABOUTME: Container lifecycle trait for execution environments.
// ABOUTME: Create, start, remove, close, and health of the job container.

use super::error::EnvironmentError;
use super::sealed::Sealed;
use super::shared_types::Health;
use async_trait::async_trait;

/// Lifecycle of the single container an environment manages.
#[async_trait]
pub trait ContainerOps: Sealed + Send + Sync {
    /// Create the container, reusing an existing one with the same name.
    async fn create(&self, cap_add: &[String], cap_drop: &[String]) -> Result<(), EnvironmentError>;

    /// Start the container. With `attach`, output goes to the log writers and
    /// a non-zero exit is an error.
    async fn start(&self, attach: bool) -> Result<(), EnvironmentError>;

    /// Force-remove the container and its anonymous volumes. Idempotent.
    async fn remove(&self) -> Result<(), EnvironmentError>;

    /// Release the connection. Idempotent.
    async fn close(&self) -> Result<(), EnvironmentError>;

    async fn health(&self) -> Health;
}

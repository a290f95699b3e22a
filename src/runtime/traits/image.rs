// ABOUTME: Image trait for execution environments.
// ABOUTME: Pulls the job image, skipping images already present.

use super::error::EnvironmentError;
use super::sealed::Sealed;
use async_trait::async_trait;

#[async_trait]
pub trait ImageOps: Sealed + Send + Sync {
    /// Pull the image unless it exists locally, or always when `force`.
    async fn pull(&self, force: bool) -> Result<(), EnvironmentError>;
}

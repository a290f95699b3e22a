// ABOUTME: Exec trait for execution environments.
// ABOUTME: Run step commands and merge environment files back into the job env.

use super::error::EnvironmentError;
use super::sealed::Sealed;
use async_trait::async_trait;
use std::collections::HashMap;

#[async_trait]
pub trait ExecOps: Sealed + Send + Sync {
    /// Run `cmd` in the started container. Non-zero exit is an error.
    ///
    /// A relative `workdir` is joined onto the container's working dir.
    async fn exec(
        &self,
        cmd: &[String],
        env: &HashMap<String, String>,
        user: &str,
        workdir: &str,
    ) -> Result<(), EnvironmentError>;

    /// Read a `KEY=value` / `KEY<<DELIM` file from the container into `env`.
    ///
    /// A missing file leaves `env` untouched.
    async fn update_from_env(
        &self,
        src_path: &str,
        env: &mut HashMap<String, String>,
    ) -> Result<(), EnvironmentError>;

    /// Merge the image's configured environment into `env`.
    ///
    /// Existing keys win, except `PATH`, which is appended to.
    async fn update_from_image_env(
        &self,
        env: &mut HashMap<String, String>,
    ) -> Result<(), EnvironmentError>;
}

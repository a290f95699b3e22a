// ABOUTME: Shared types used across the execution-environment traits.
// ABOUTME: NewContainerInput, FileEntry, Health, RunnerContext, log sinks.

use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;

/// Destination for container output.
pub type LogWriter = Box<dyn Write + Send>;

/// Everything needed to create one job container.
#[derive(Debug, Clone, Default)]
pub struct NewContainerInput {
    /// Image to run.
    pub image: String,
    /// Container name. Reused if a container with this name already exists.
    pub name: String,
    /// Registry credentials.
    pub username: Option<String>,
    pub password: Option<String>,
    /// Entrypoint (overrides image ENTRYPOINT when non-empty).
    pub entrypoint: Vec<String>,
    /// Command (overrides image CMD when non-empty).
    pub cmd: Vec<String>,
    /// Working directory; relative exec workdirs are joined onto it.
    pub working_dir: String,
    /// `KEY=value` environment entries.
    pub env: Vec<String>,
    /// Bind mounts in `host:container[:opts]` form.
    pub binds: Vec<String>,
    /// Named volume -> container path.
    pub mounts: HashMap<String, String>,
    pub network_mode: Option<String>,
    pub privileged: bool,
    pub userns_mode: Option<String>,
    /// Requested platform such as `linux/arm64`.
    pub platform: Option<String>,
    pub auto_remove: bool,
}

impl NewContainerInput {
    pub fn new(image: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub(crate) fn has_credentials(&self) -> bool {
        self.username.as_deref().is_some_and(|u| !u.is_empty())
    }
}

/// A file to write into a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path relative to the copy destination.
    pub name: String,
    /// Unix permission bits.
    pub mode: u32,
    pub body: Vec<u8>,
}

impl FileEntry {
    pub fn new(name: impl Into<String>, mode: u32, body: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            mode,
            body: body.into(),
        }
    }
}

/// Container health as reported by the runtime.
///
/// Containers without a healthcheck count as healthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Health {
    Healthy,
    Unhealthy,
    /// Healthcheck still starting, or no container yet.
    #[default]
    Unknown,
}

/// Values exposed to workflow steps as the `runner` context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunnerContext {
    pub os: String,
    pub arch: String,
    pub temp: String,
    pub tool_cache: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
}

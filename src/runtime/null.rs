// ABOUTME: Inert execution environment returned when no runtime is usable.
// ABOUTME: Every side effect fails with the detector's diagnostic report.

use super::detection::RuntimeDetector;
use super::traits::sealed::Sealed;
use super::traits::{
    ArchiveStream, ContainerOps, CopyOps, EnvironmentError, EnvironmentInfo, ExecOps, FileEntry,
    Health, ImageOps, LINUX_DEFAULT_PATH, LINUX_PATH_NAME, LogOps, LogWriter, NewContainerInput,
    RunnerContext, TOOL_CACHE, TarReader, join_linux_path,
};
use super::types::RuntimeType;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::OnceCell;

const NULL_ACT_PATH: &str = "/opt/act";
const NULL_WORKSPACE: &str = "/github/workspace";

/// Placeholder environment. Never absent, never does anything.
pub struct NullContainer {
    input: NewContainerInput,
    detector: Arc<RuntimeDetector>,
    forced: Option<RuntimeType>,
    report: OnceCell<String>,
}

impl std::fmt::Debug for NullContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NullContainer")
            .field("image", &self.input.image)
            .field("forced", &self.forced)
            .finish()
    }
}

impl NullContainer {
    /// Placeholder for when auto-detection found nothing.
    pub fn unavailable(input: NewContainerInput, detector: Arc<RuntimeDetector>) -> Self {
        Self {
            input,
            detector,
            forced: None,
            report: OnceCell::new(),
        }
    }

    /// Placeholder for a forced runtime that failed verification.
    pub fn forced(
        input: NewContainerInput,
        detector: Arc<RuntimeDetector>,
        runtime: RuntimeType,
    ) -> Self {
        Self {
            forced: Some(runtime),
            ..Self::unavailable(input, detector)
        }
    }

    pub fn input(&self) -> &NewContainerInput {
        &self.input
    }

    /// The runtime that was forced, if any.
    pub fn forced_runtime(&self) -> Option<RuntimeType> {
        self.forced
    }

    async fn report(&self) -> &str {
        self.report
            .get_or_init(|| self.detector.diagnostic_report())
            .await
    }

    /// The error every side-effecting operation returns.
    pub async fn error(&self) -> EnvironmentError {
        let report = self.report().await.to_string();
        match self.forced {
            Some(runtime) => EnvironmentError::ForcedUnavailable { runtime, report },
            None => EnvironmentError::Unavailable { report },
        }
    }

    async fn fail<T>(&self) -> Result<T, EnvironmentError> {
        Err(self.error().await)
    }
}

impl Sealed for NullContainer {}

#[async_trait]
impl ContainerOps for NullContainer {
    async fn create(&self, _cap_add: &[String], _cap_drop: &[String]) -> Result<(), EnvironmentError> {
        self.fail().await
    }

    async fn start(&self, _attach: bool) -> Result<(), EnvironmentError> {
        self.fail().await
    }

    async fn remove(&self) -> Result<(), EnvironmentError> {
        self.fail().await
    }

    async fn close(&self) -> Result<(), EnvironmentError> {
        self.fail().await
    }

    async fn health(&self) -> Health {
        Health::Unhealthy
    }
}

#[async_trait]
impl ImageOps for NullContainer {
    async fn pull(&self, _force: bool) -> Result<(), EnvironmentError> {
        self.fail().await
    }
}

#[async_trait]
impl CopyOps for NullContainer {
    async fn copy(&self, _dest: &str, _files: &[FileEntry]) -> Result<(), EnvironmentError> {
        self.fail().await
    }

    async fn copy_dir(
        &self,
        _dest: &str,
        _src: &Path,
        _use_gitignore: bool,
    ) -> Result<(), EnvironmentError> {
        self.fail().await
    }

    async fn container_archive(&self, _src: &str) -> Result<ArchiveStream, EnvironmentError> {
        self.fail().await
    }

    async fn copy_tar_stream(&self, _dest: &str, _tar: TarReader) -> Result<(), EnvironmentError> {
        self.fail().await
    }
}

#[async_trait]
impl ExecOps for NullContainer {
    async fn exec(
        &self,
        _cmd: &[String],
        _env: &HashMap<String, String>,
        _user: &str,
        _workdir: &str,
    ) -> Result<(), EnvironmentError> {
        self.fail().await
    }

    async fn update_from_env(
        &self,
        _src_path: &str,
        _env: &mut HashMap<String, String>,
    ) -> Result<(), EnvironmentError> {
        self.fail().await
    }

    async fn update_from_image_env(
        &self,
        _env: &mut HashMap<String, String>,
    ) -> Result<(), EnvironmentError> {
        self.fail().await
    }
}

impl LogOps for NullContainer {
    fn replace_log_writer(&self, stdout: LogWriter, stderr: LogWriter) -> (LogWriter, LogWriter) {
        (stdout, stderr)
    }
}

impl EnvironmentInfo for NullContainer {
    fn to_container_path(&self, path: &str) -> String {
        path.to_string()
    }

    fn act_path(&self) -> String {
        NULL_ACT_PATH.to_string()
    }

    fn path_variable_name(&self) -> String {
        LINUX_PATH_NAME.to_string()
    }

    fn default_path_variable(&self) -> String {
        LINUX_DEFAULT_PATH.to_string()
    }

    fn join_path_variable(&self, paths: &[String]) -> String {
        join_linux_path(paths)
    }

    fn is_environment_case_insensitive(&self) -> bool {
        false
    }

    fn runner_context(&self) -> RunnerContext {
        RunnerContext {
            os: "linux".to_string(),
            arch: "x64".to_string(),
            temp: "/tmp".to_string(),
            tool_cache: TOOL_CACHE.to_string(),
            action_path: Some(NULL_WORKSPACE.to_string()),
            workspace: Some(NULL_WORKSPACE.to_string()),
        }
    }
}

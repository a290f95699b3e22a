// ABOUTME: The execution environment handle handed out by the factory.
// ABOUTME: A tagged variant over the Docker, Podman and null adapters.

use super::docker::DockerContainer;
use super::null::NullContainer;
use super::podman::PodmanContainer;
use super::traits::sealed::Sealed;
use super::traits::{
    ArchiveStream, ContainerOps, CopyOps, EnvironmentError, EnvironmentInfo, ExecOps, FileEntry,
    Health, ImageOps, LogOps, LogWriter, NewContainerInput, RunnerContext, TarReader,
};
use super::types::RuntimeType;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

/// One job container on whichever runtime was selected.
#[derive(Debug)]
pub enum Container {
    Docker(DockerContainer),
    Podman(PodmanContainer),
    Null(NullContainer),
}

macro_rules! dispatch {
    ($self:ident, $c:ident => $body:expr) => {
        match $self {
            Container::Docker($c) => $body,
            Container::Podman($c) => $body,
            Container::Null($c) => $body,
        }
    };
}

impl Container {
    /// Backing runtime; `Unknown` for the null adapter.
    pub fn runtime(&self) -> RuntimeType {
        match self {
            Container::Docker(_) => RuntimeType::Docker,
            Container::Podman(_) => RuntimeType::Podman,
            Container::Null(_) => RuntimeType::Unknown,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Container::Null(_))
    }

    pub fn input(&self) -> &NewContainerInput {
        dispatch!(self, c => c.input())
    }
}

impl Sealed for Container {}

#[async_trait]
impl ContainerOps for Container {
    async fn create(&self, cap_add: &[String], cap_drop: &[String]) -> Result<(), EnvironmentError> {
        dispatch!(self, c => c.create(cap_add, cap_drop).await)
    }

    async fn start(&self, attach: bool) -> Result<(), EnvironmentError> {
        dispatch!(self, c => c.start(attach).await)
    }

    async fn remove(&self) -> Result<(), EnvironmentError> {
        dispatch!(self, c => c.remove().await)
    }

    async fn close(&self) -> Result<(), EnvironmentError> {
        dispatch!(self, c => c.close().await)
    }

    async fn health(&self) -> Health {
        dispatch!(self, c => c.health().await)
    }
}

#[async_trait]
impl ImageOps for Container {
    async fn pull(&self, force: bool) -> Result<(), EnvironmentError> {
        dispatch!(self, c => c.pull(force).await)
    }
}

#[async_trait]
impl CopyOps for Container {
    async fn copy(&self, dest: &str, files: &[FileEntry]) -> Result<(), EnvironmentError> {
        dispatch!(self, c => c.copy(dest, files).await)
    }

    async fn copy_dir(
        &self,
        dest: &str,
        src: &Path,
        use_gitignore: bool,
    ) -> Result<(), EnvironmentError> {
        dispatch!(self, c => c.copy_dir(dest, src, use_gitignore).await)
    }

    async fn container_archive(&self, src: &str) -> Result<ArchiveStream, EnvironmentError> {
        dispatch!(self, c => c.container_archive(src).await)
    }

    async fn copy_tar_stream(&self, dest: &str, tar: TarReader) -> Result<(), EnvironmentError> {
        dispatch!(self, c => c.copy_tar_stream(dest, tar).await)
    }
}

#[async_trait]
impl ExecOps for Container {
    async fn exec(
        &self,
        cmd: &[String],
        env: &HashMap<String, String>,
        user: &str,
        workdir: &str,
    ) -> Result<(), EnvironmentError> {
        dispatch!(self, c => c.exec(cmd, env, user, workdir).await)
    }

    async fn update_from_env(
        &self,
        src_path: &str,
        env: &mut HashMap<String, String>,
    ) -> Result<(), EnvironmentError> {
        dispatch!(self, c => c.update_from_env(src_path, env).await)
    }

    async fn update_from_image_env(
        &self,
        env: &mut HashMap<String, String>,
    ) -> Result<(), EnvironmentError> {
        dispatch!(self, c => c.update_from_image_env(env).await)
    }
}

impl LogOps for Container {
    fn replace_log_writer(&self, stdout: LogWriter, stderr: LogWriter) -> (LogWriter, LogWriter) {
        dispatch!(self, c => c.replace_log_writer(stdout, stderr))
    }
}

impl EnvironmentInfo for Container {
    fn to_container_path(&self, path: &str) -> String {
        dispatch!(self, c => c.to_container_path(path))
    }

    fn act_path(&self) -> String {
        dispatch!(self, c => c.act_path())
    }

    fn path_variable_name(&self) -> String {
        dispatch!(self, c => c.path_variable_name())
    }

    fn default_path_variable(&self) -> String {
        dispatch!(self, c => c.default_path_variable())
    }

    fn join_path_variable(&self, paths: &[String]) -> String {
        dispatch!(self, c => c.join_path_variable(paths))
    }

    fn is_environment_case_insensitive(&self) -> bool {
        dispatch!(self, c => c.is_environment_case_insensitive())
    }

    fn runner_context(&self) -> RunnerContext {
        dispatch!(self, c => c.runner_context())
    }
}

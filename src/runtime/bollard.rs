// ABOUTME: Bollard-based execution environment shared by the Docker and Podman adapters.
// ABOUTME: Backend hooks cover connection, error hints, pre-start checks, and native pulls.

use super::connect::{ConnectError, Connection};
use super::detection::RuntimeDetector;
use super::envfile::{merge_image_env, parse_env_file};
use super::ignore::collect_files;
use super::traits::sealed::Sealed;
use super::traits::{
    ArchiveStream, ContainerOps, CopyOps, EnvironmentError, EnvironmentInfo, ExecOps, FileEntry,
    Health, ImageOps, LINUX_ACT_PATH, LINUX_DEFAULT_PATH, LINUX_PATH_NAME, LogOps, LogWriter,
    NewContainerInput, RunnerContext, TarReader, join_linux_path, linux_container_path,
    linux_runner_context,
};
use super::types::RuntimeType;
use crate::types::{ContainerId, ExecId};
use async_trait::async_trait;
use bollard::Docker;
use bollard::container::{AttachContainerResults, LogOutput};
use bollard::exec::{StartExecOptions, StartExecResults};
use bollard::models::{ContainerCreateBody, HealthStatusEnum, HostConfig, Mount, MountTypeEnum};
use bollard::query_parameters::{
    AttachContainerOptions, CreateContainerOptions, CreateImageOptions,
    DownloadFromContainerOptions, InspectContainerOptions, RemoveContainerOptions,
    StartContainerOptions, UploadToContainerOptions, WaitContainerOptions,
};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::io::AsyncReadExt;

// =============================================================================
// Error Mapping Helpers
// =============================================================================

fn is_not_found(e: &bollard::errors::Error) -> bool {
    matches!(
        e,
        bollard::errors::Error::DockerResponseServerError {
            status_code: 404,
            ..
        }
    )
}

fn runtime_error(action: &str, e: bollard::errors::Error) -> EnvironmentError {
    EnvironmentError::Runtime(format!("{}: {}", action, e))
}

/// Drain an env-file download. `None` when the file does not exist.
async fn collect_env_archive<S>(
    mut stream: S,
    path: &str,
) -> Result<Option<Vec<u8>>, EnvironmentError>
where
    S: Stream<Item = Result<Bytes, bollard::errors::Error>> + Unpin,
{
    let mut archive = Vec::new();
    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(bytes) => archive.extend_from_slice(&bytes),
            Err(e) if is_not_found(&e) => {
                tracing::debug!(path, "env file not present");
                return Ok(None);
            }
            Err(e) => return Err(runtime_error(&format!("failed to read {}", path), e)),
        }
    }
    Ok(Some(archive))
}

fn archive_error(e: impl std::fmt::Display) -> EnvironmentError {
    EnvironmentError::Archive(e.to_string())
}

// =============================================================================
// Backend hooks
// =============================================================================

/// What differs between runtimes speaking the Docker API.
#[async_trait]
pub trait Backend: Send + Sync + 'static {
    fn runtime(&self) -> RuntimeType;

    /// Open a client for this runtime.
    async fn connect(&self, detector: &RuntimeDetector) -> Result<Connection, ConnectError>;

    /// Rewrap a container-creation failure.
    fn map_create_error(&self, err: EnvironmentError) -> EnvironmentError {
        err
    }

    /// Runs before every container start. Failures here must not abort the start.
    async fn before_start(&self, _conn: &Connection) {}

    /// Pull through a runtime-native endpoint. `None` means use the Docker API.
    async fn native_pull(
        &self,
        _conn: &Connection,
        _input: &NewContainerInput,
        _force: bool,
    ) -> Option<Result<(), EnvironmentError>> {
        None
    }
}

struct LogWriters {
    stdout: LogWriter,
    stderr: LogWriter,
}

impl LogWriters {
    fn write(&mut self, output: LogOutput) {
        let result = match output {
            LogOutput::StdErr { message } => self.stderr.write_all(&message),
            LogOutput::StdOut { message } | LogOutput::Console { message } => {
                self.stdout.write_all(&message)
            }
            LogOutput::StdIn { .. } => Ok(()),
        };
        if let Err(e) = result {
            tracing::debug!("failed to write container output: {}", e);
        }
    }
}

// =============================================================================
// BollardContainer
// =============================================================================

/// One job container on a Docker-API runtime.
///
/// The connection is opened on first use and shared by later operations.
pub struct BollardContainer<B: Backend> {
    backend: B,
    input: NewContainerInput,
    detector: Arc<RuntimeDetector>,
    conn: parking_lot::Mutex<Option<Arc<Connection>>>,
    id: parking_lot::Mutex<Option<ContainerId>>,
    writers: Arc<parking_lot::Mutex<LogWriters>>,
}

impl<B: Backend> std::fmt::Debug for BollardContainer<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BollardContainer")
            .field("runtime", &self.backend.runtime())
            .field("image", &self.input.image)
            .field("name", &self.input.name)
            .field("id", &*self.id.lock())
            .finish()
    }
}

impl<B: Backend> BollardContainer<B> {
    pub(crate) fn with_backend(
        backend: B,
        input: NewContainerInput,
        detector: Arc<RuntimeDetector>,
    ) -> Self {
        Self {
            backend,
            input,
            detector,
            conn: parking_lot::Mutex::new(None),
            id: parking_lot::Mutex::new(None),
            writers: Arc::new(parking_lot::Mutex::new(LogWriters {
                stdout: Box::new(std::io::stdout()),
                stderr: Box::new(std::io::stderr()),
            })),
        }
    }

    pub fn runtime(&self) -> RuntimeType {
        self.backend.runtime()
    }

    pub fn input(&self) -> &NewContainerInput {
        &self.input
    }

    /// ID of the created container, if any.
    pub fn container_id(&self) -> Option<ContainerId> {
        self.id.lock().clone()
    }

    fn require_id(&self) -> Result<ContainerId, EnvironmentError> {
        self.container_id().ok_or(EnvironmentError::NotCreated)
    }

    /// The shared connection, opened on first call.
    ///
    /// The lock is never held while connecting. If two callers race, the
    /// first installed connection wins and the other is closed.
    pub async fn connection(&self) -> Result<Arc<Connection>, EnvironmentError> {
        let existing = self.conn.lock().clone();
        if let Some(conn) = existing {
            return Ok(conn);
        }

        let fresh = Arc::new(self.backend.connect(&self.detector).await?);
        let (conn, loser) = {
            let mut slot = self.conn.lock();
            match slot.as_ref() {
                Some(existing) => (Arc::clone(existing), Some(fresh)),
                None => {
                    *slot = Some(Arc::clone(&fresh));
                    (fresh, None)
                }
            }
        };

        match loser.and_then(|c| Arc::try_unwrap(c).ok()) {
            Some(loser) => loser.close().await,
            None => tracing::debug!(
                runtime = %self.runtime(),
                socket = conn.uri(),
                "connected to container runtime"
            ),
        }
        Ok(conn)
    }

    async fn create_container(
        &self,
        cap_add: &[String],
        cap_drop: &[String],
    ) -> Result<(), EnvironmentError> {
        if self.id.lock().is_some() {
            return Ok(());
        }

        let conn = self.connection().await?;
        let client = conn.client();

        if !self.input.name.is_empty() {
            match client
                .inspect_container(&self.input.name, None::<InspectContainerOptions>)
                .await
            {
                Ok(existing) => {
                    if let Some(id) = existing.id {
                        tracing::debug!(name = %self.input.name, id = %id, "reusing existing container");
                        *self.id.lock() = Some(ContainerId::new(id));
                        return Ok(());
                    }
                }
                Err(e) if is_not_found(&e) => {}
                Err(e) => return Err(runtime_error("failed to inspect container", e)),
            }
        }

        let mounts: Vec<Mount> = self
            .input
            .mounts
            .iter()
            .map(|(volume, target)| Mount {
                source: Some(volume.clone()),
                target: Some(target.clone()),
                typ: Some(MountTypeEnum::VOLUME),
                ..Default::default()
            })
            .collect();

        let host_config = HostConfig {
            binds: non_empty(self.input.binds.clone()),
            mounts: non_empty(mounts),
            cap_add: non_empty(cap_add.to_vec()),
            cap_drop: non_empty(cap_drop.to_vec()),
            privileged: Some(self.input.privileged),
            userns_mode: self.input.userns_mode.clone(),
            network_mode: self.input.network_mode.clone(),
            auto_remove: Some(self.input.auto_remove),
            ..Default::default()
        };

        let body = ContainerCreateBody {
            image: Some(self.input.image.clone()),
            cmd: non_empty(self.input.cmd.clone()),
            entrypoint: non_empty(self.input.entrypoint.clone()),
            working_dir: non_blank(&self.input.working_dir),
            env: non_empty(self.input.env.clone()),
            host_config: Some(host_config),
            ..Default::default()
        };

        let opts = CreateContainerOptions {
            name: non_blank(&self.input.name),
            ..Default::default()
        };

        let response = client
            .create_container(Some(opts), body)
            .await
            .map_err(|e| runtime_error("failed to create container", e))?;

        for warning in &response.warnings {
            tracing::warn!(image = %self.input.image, "{}", warning);
        }

        tracing::debug!(
            runtime = %self.runtime(),
            id = %response.id,
            image = %self.input.image,
            "created container"
        );
        *self.id.lock() = Some(ContainerId::new(response.id));
        Ok(())
    }

    async fn image_exists(&self, client: &Docker) -> Result<bool, EnvironmentError> {
        match client.inspect_image(&self.input.image).await {
            Ok(_) => Ok(true),
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(runtime_error(
                &format!("failed to inspect image {}", self.input.image),
                e,
            )),
        }
    }

    async fn upload(
        &self,
        client: &Docker,
        id: &ContainerId,
        path: &str,
        tar: Vec<u8>,
    ) -> Result<(), EnvironmentError> {
        let opts = UploadToContainerOptions {
            path: path.to_string(),
            ..Default::default()
        };
        client
            .upload_to_container(id.as_str(), Some(opts), bollard::body_full(Bytes::from(tar)))
            .await
            .map_err(|e| runtime_error(&format!("failed to copy into {}", path), e))
    }
}

/// `None` for empty collections so the runtime keeps its defaults.
fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}

fn non_blank(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Resolve an exec working directory against the container's.
pub(crate) fn resolve_workdir(base: &str, workdir: &str) -> Option<String> {
    if workdir.is_empty() {
        return non_blank(base);
    }
    if workdir.starts_with('/') || base.is_empty() {
        return Some(workdir.to_string());
    }
    Some(format!("{}/{}", base.trim_end_matches('/'), workdir))
}

/// Append `:latest` to references without a tag or digest.
pub(crate) fn image_with_tag(image: &str) -> String {
    let name = image.rsplit('/').next().unwrap_or(image);
    if image.contains('@') || name.contains(':') {
        image.to_string()
    } else {
        format!("{}:latest", image)
    }
}

/// Archive path for `name` below `dest`, without a leading slash.
fn archive_path(dest: &str, name: &str) -> String {
    let dest = dest.trim_matches('/');
    let name = name.trim_start_matches('/');
    if dest.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dest, name)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn files_tar(dest: &str, files: &[FileEntry]) -> Result<Vec<u8>, EnvironmentError> {
    let mtime = unix_now();
    let mut builder = tar::Builder::new(Vec::new());
    for file in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(file.body.len() as u64);
        header.set_mode(file.mode);
        header.set_mtime(mtime);
        builder
            .append_data(&mut header, archive_path(dest, &file.name), file.body.as_slice())
            .map_err(archive_error)?;
    }
    builder.into_inner().map_err(archive_error)
}

fn dir_tar(dest: &str, src: &Path, use_gitignore: bool) -> Result<Vec<u8>, EnvironmentError> {
    let files = collect_files(src, use_gitignore)?;
    let mut builder = tar::Builder::new(Vec::new());
    builder.follow_symlinks(false);
    for rel in &files {
        let name: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        builder
            .append_path_with_name(src.join(rel), archive_path(dest, &name.join("/")))
            .map_err(archive_error)?;
    }
    builder.into_inner().map_err(archive_error)
}

/// A tar holding only the directory `dest`, so extracting into it cannot fail.
fn mkdir_tar(dest: &str) -> Result<Vec<u8>, EnvironmentError> {
    let mut builder = tar::Builder::new(Vec::new());
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::Directory);
    header.set_mode(0o755);
    header.set_size(0);
    header.set_mtime(unix_now());
    builder
        .append_data(&mut header, format!("{}/", dest.trim_matches('/')), std::io::empty())
        .map_err(archive_error)?;
    builder.into_inner().map_err(archive_error)
}

fn first_entry_text(archive: &[u8]) -> Result<String, EnvironmentError> {
    let mut archive = tar::Archive::new(archive);
    let mut entries = archive.entries().map_err(archive_error)?;
    let mut text = String::new();
    if let Some(entry) = entries.next() {
        entry
            .map_err(archive_error)?
            .read_to_string(&mut text)
            .map_err(archive_error)?;
    }
    Ok(text)
}

async fn pump_output<S>(mut output: S, writers: Arc<parking_lot::Mutex<LogWriters>>)
where
    S: Stream<Item = Result<LogOutput, bollard::errors::Error>> + Unpin,
{
    while let Some(item) = output.next().await {
        match item {
            Ok(chunk) => writers.lock().write(chunk),
            Err(e) => {
                tracing::debug!("container output stream ended: {}", e);
                break;
            }
        }
    }
}

async fn wait_for_exit(client: &Docker, id: &ContainerId) -> Result<(), EnvironmentError> {
    let mut wait = client.wait_container(id.as_str(), None::<WaitContainerOptions>);
    match wait.next().await {
        Some(Ok(response)) if response.status_code == 0 => Ok(()),
        Some(Ok(response)) => Err(EnvironmentError::ExitCode(response.status_code)),
        Some(Err(bollard::errors::Error::DockerContainerWaitError { code, .. })) => {
            Err(EnvironmentError::ExitCode(code))
        }
        Some(Err(e)) => Err(runtime_error("failed to wait for container", e)),
        None => Ok(()),
    }
}

impl<B: Backend> Sealed for BollardContainer<B> {}

#[async_trait]
impl<B: Backend> ContainerOps for BollardContainer<B> {
    async fn create(&self, cap_add: &[String], cap_drop: &[String]) -> Result<(), EnvironmentError> {
        self.create_container(cap_add, cap_drop)
            .await
            .map_err(|e| self.backend.map_create_error(e))
    }

    async fn start(&self, attach: bool) -> Result<(), EnvironmentError> {
        let id = self.require_id()?;
        let conn = self.connection().await?;
        let client = conn.client();

        self.backend.before_start(&conn).await;

        let pump = if attach {
            let opts = AttachContainerOptions {
                stdout: true,
                stderr: true,
                stream: true,
                ..Default::default()
            };
            let AttachContainerResults { output, .. } = client
                .attach_container(id.as_str(), Some(opts))
                .await
                .map_err(|e| runtime_error("failed to attach to container", e))?;
            Some(tokio::spawn(pump_output(output, Arc::clone(&self.writers))))
        } else {
            None
        };

        if let Err(e) = client
            .start_container(id.as_str(), None::<StartContainerOptions>)
            .await
        {
            if let Some(pump) = &pump {
                pump.abort();
            }
            return Err(runtime_error("failed to start container", e));
        }

        tracing::debug!(runtime = %self.runtime(), id = %id.short(), attach, "started container");

        match pump {
            Some(pump) => {
                let exit = wait_for_exit(client, &id).await;
                if let Err(e) = pump.await {
                    tracing::debug!("output pump stopped: {}", e);
                }
                exit
            }
            None => Ok(()),
        }
    }

    async fn remove(&self) -> Result<(), EnvironmentError> {
        let Some(id) = self.container_id() else {
            return Ok(());
        };
        let conn = self.connection().await?;

        let opts = RemoveContainerOptions {
            force: true,
            v: true,
            ..Default::default()
        };
        match conn.client().remove_container(id.as_str(), Some(opts)).await {
            Ok(()) => {}
            Err(e) if is_not_found(&e) => {}
            Err(e) => return Err(runtime_error("failed to remove container", e)),
        }

        tracing::debug!(id = %id.short(), "removed container");
        *self.id.lock() = None;
        Ok(())
    }

    async fn close(&self) -> Result<(), EnvironmentError> {
        let conn = self.conn.lock().take();
        if let Some(conn) = conn
            && let Ok(conn) = Arc::try_unwrap(conn)
        {
            conn.close().await;
        }
        Ok(())
    }

    async fn health(&self) -> Health {
        let Some(id) = self.container_id() else {
            return Health::Unknown;
        };
        let conn = match self.connection().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::debug!("health check could not connect: {}", e);
                return Health::Unknown;
            }
        };

        let details = match conn
            .client()
            .inspect_container(id.as_str(), None::<InspectContainerOptions>)
            .await
        {
            Ok(details) => details,
            Err(e) => {
                tracing::debug!(id = %id.short(), "failed to inspect container: {}", e);
                return Health::Unhealthy;
            }
        };

        let disabled = details
            .config
            .as_ref()
            .and_then(|c| c.healthcheck.as_ref())
            .and_then(|h| h.test.as_ref())
            .is_none_or(|test| test.len() == 1 && test[0].eq_ignore_ascii_case("NONE"));
        if disabled {
            return Health::Healthy;
        }

        match details.state.and_then(|s| s.health).and_then(|h| h.status) {
            Some(HealthStatusEnum::HEALTHY) | None => Health::Healthy,
            Some(HealthStatusEnum::UNHEALTHY) => Health::Unhealthy,
            _ => Health::Unknown,
        }
    }
}

#[async_trait]
impl<B: Backend> ImageOps for BollardContainer<B> {
    async fn pull(&self, force: bool) -> Result<(), EnvironmentError> {
        let conn = self.connection().await?;
        let client = conn.client();

        if !force && self.image_exists(client).await? {
            tracing::debug!(image = %self.input.image, "image exists locally, skipping pull");
            return Ok(());
        }

        if let Some(result) = self.backend.native_pull(&conn, &self.input, force).await {
            return result;
        }

        let reference = image_with_tag(&self.input.image);
        tracing::info!(runtime = %self.runtime(), image = %reference, "pulling image");

        let opts = CreateImageOptions {
            from_image: Some(reference.clone()),
            ..Default::default()
        };
        let credentials = self
            .input
            .has_credentials()
            .then(|| bollard::auth::DockerCredentials {
                username: self.input.username.clone(),
                password: self.input.password.clone(),
                ..Default::default()
            });

        let mut stream = client.create_image(Some(opts), None, credentials);
        while let Some(progress) = stream.next().await {
            progress.map_err(|e| runtime_error(&format!("failed to pull {}", reference), e))?;
        }
        Ok(())
    }
}

#[async_trait]
impl<B: Backend> CopyOps for BollardContainer<B> {
    async fn copy(&self, dest: &str, files: &[FileEntry]) -> Result<(), EnvironmentError> {
        let id = self.require_id()?;
        let conn = self.connection().await?;
        let tar = files_tar(dest, files)?;
        self.upload(conn.client(), &id, "/", tar).await
    }

    async fn copy_dir(
        &self,
        dest: &str,
        src: &Path,
        use_gitignore: bool,
    ) -> Result<(), EnvironmentError> {
        let id = self.require_id()?;
        let conn = self.connection().await?;

        let dest_owned = dest.to_string();
        let src_owned: PathBuf = src.to_path_buf();
        let tar = tokio::task::spawn_blocking(move || dir_tar(&dest_owned, &src_owned, use_gitignore))
            .await
            .map_err(archive_error)??;

        tracing::debug!(src = %src.display(), dest, bytes = tar.len(), "copying directory");
        self.upload(conn.client(), &id, "/", tar).await
    }

    async fn container_archive(&self, src: &str) -> Result<ArchiveStream, EnvironmentError> {
        let id = self.require_id()?;
        let conn = self.connection().await?;

        let opts = DownloadFromContainerOptions {
            path: src.to_string(),
            ..Default::default()
        };
        let src = src.to_string();
        let stream = conn
            .client()
            .download_from_container(id.as_str(), Some(opts))
            .map(move |chunk| {
                chunk.map_err(|e| runtime_error(&format!("failed to read {}", src), e))
            });
        Ok(Box::pin(stream))
    }

    async fn copy_tar_stream(&self, dest: &str, mut tar: TarReader) -> Result<(), EnvironmentError> {
        let id = self.require_id()?;
        let conn = self.connection().await?;

        let mut archive = Vec::new();
        tar.read_to_end(&mut archive).await?;

        if !dest.trim_matches('/').is_empty() {
            self.upload(conn.client(), &id, "/", mkdir_tar(dest)?).await?;
        }
        self.upload(conn.client(), &id, dest, archive).await
    }
}

#[async_trait]
impl<B: Backend> ExecOps for BollardContainer<B> {
    async fn exec(
        &self,
        cmd: &[String],
        env: &HashMap<String, String>,
        user: &str,
        workdir: &str,
    ) -> Result<(), EnvironmentError> {
        let id = self.require_id()?;
        let conn = self.connection().await?;
        let client = conn.client();

        let mut env_list: Vec<String> = env.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        env_list.sort();
        let working_dir = resolve_workdir(&self.input.working_dir, workdir);

        tracing::debug!(id = %id.short(), cmd = ?cmd, user, workdir = ?working_dir, "exec");

        let config = bollard::models::ExecConfig {
            cmd: Some(cmd.to_vec()),
            env: non_empty(env_list),
            user: non_blank(user),
            working_dir,
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            ..Default::default()
        };

        let created = client
            .create_exec(id.as_str(), config)
            .await
            .map_err(|e| runtime_error("failed to create exec", e))?;
        let exec_id = ExecId::new(created.id);

        let opts = StartExecOptions {
            detach: false,
            ..Default::default()
        };
        let started = client
            .start_exec(exec_id.as_str(), Some(opts))
            .await
            .map_err(|e| runtime_error("failed to start exec", e))?;

        if let StartExecResults::Attached { output, .. } = started {
            pump_output(output, Arc::clone(&self.writers)).await;
        }

        let inspect = client
            .inspect_exec(exec_id.as_str())
            .await
            .map_err(|e| runtime_error("failed to inspect exec", e))?;

        match inspect.exit_code {
            Some(0) | None => Ok(()),
            Some(code) => Err(EnvironmentError::ExitCode(code)),
        }
    }

    async fn update_from_env(
        &self,
        src_path: &str,
        env: &mut HashMap<String, String>,
    ) -> Result<(), EnvironmentError> {
        let id = self.require_id()?;
        let conn = self.connection().await?;

        let opts = DownloadFromContainerOptions {
            path: src_path.to_string(),
            ..Default::default()
        };
        let stream = Box::pin(conn.client().download_from_container(id.as_str(), Some(opts)));
        let Some(archive) = collect_env_archive(stream, src_path).await? else {
            return Ok(());
        };

        let content = first_entry_text(&archive)?;
        parse_env_file(&content, env).map_err(|e| EnvironmentError::EnvFile {
            path: src_path.to_string(),
            reason: e.to_string(),
        })
    }

    async fn update_from_image_env(
        &self,
        env: &mut HashMap<String, String>,
    ) -> Result<(), EnvironmentError> {
        let conn = self.connection().await?;
        let image = conn
            .client()
            .inspect_image(&self.input.image)
            .await
            .map_err(|e| runtime_error(&format!("failed to inspect image {}", self.input.image), e))?;

        let image_env = image.config.and_then(|c| c.env).unwrap_or_default();
        merge_image_env(&image_env, env);
        Ok(())
    }
}

impl<B: Backend> LogOps for BollardContainer<B> {
    fn replace_log_writer(&self, stdout: LogWriter, stderr: LogWriter) -> (LogWriter, LogWriter) {
        let mut writers = self.writers.lock();
        let old_stdout = std::mem::replace(&mut writers.stdout, stdout);
        let old_stderr = std::mem::replace(&mut writers.stderr, stderr);
        (old_stdout, old_stderr)
    }
}

impl<B: Backend> EnvironmentInfo for BollardContainer<B> {
    fn to_container_path(&self, path: &str) -> String {
        linux_container_path(path)
    }

    fn act_path(&self) -> String {
        LINUX_ACT_PATH.to_string()
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
        linux_runner_context(self.input.platform.as_deref())
    }
}

// ABOUTME: File transfer trait for execution environments.
// ABOUTME: Copy files, directories and tar streams in and out of the container.

use super::error::EnvironmentError;
use super::sealed::Sealed;
use super::shared_types::FileEntry;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::path::Path;
use std::pin::Pin;
use tokio::io::AsyncRead;

/// Tar archive bytes streamed out of a container.
pub type ArchiveStream = Pin<Box<dyn Stream<Item = Result<Bytes, EnvironmentError>> + Send>>;

/// Tar archive bytes supplied by the caller.
pub type TarReader = Box<dyn AsyncRead + Send + Unpin>;

#[async_trait]
pub trait CopyOps: Sealed + Send + Sync {
    /// Write `files` under `dest` inside the container.
    async fn copy(&self, dest: &str, files: &[FileEntry]) -> Result<(), EnvironmentError>;

    /// Copy the host directory `src` to `dest`.
    ///
    /// `.git` is always skipped; with `use_gitignore`, `.gitignore` files
    /// found while walking exclude matching paths.
    async fn copy_dir(&self, dest: &str, src: &Path, use_gitignore: bool)
    -> Result<(), EnvironmentError>;

    /// Stream `src` out of the container as a tar archive.
    async fn container_archive(&self, src: &str) -> Result<ArchiveStream, EnvironmentError>;

    /// Extract a caller-provided tar stream at `dest`.
    async fn copy_tar_stream(&self, dest: &str, tar: TarReader) -> Result<(), EnvironmentError>;
}

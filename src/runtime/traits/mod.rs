// ABOUTME: Composable capability traits for execution environments.
// ABOUTME: Defines ContainerOps, ImageOps, CopyOps, ExecOps, LogOps, EnvironmentInfo.

mod container;
mod copy;
mod environment;
mod error;
mod exec;
mod image;
mod logs;
pub(crate) mod sealed;
mod shared_types;

pub use container::ContainerOps;
pub use copy::{ArchiveStream, CopyOps, TarReader};
pub use environment::{
    EnvironmentInfo, ExecutionEnvironment, join_linux_path, linux_container_path,
    linux_runner_context, runner_arch,
};
pub(crate) use environment::{LINUX_ACT_PATH, LINUX_DEFAULT_PATH, LINUX_PATH_NAME, TOOL_CACHE};
pub use error::EnvironmentError;
pub use exec::ExecOps;
pub use image::ImageOps;
pub use logs::LogOps;
pub use shared_types::*;

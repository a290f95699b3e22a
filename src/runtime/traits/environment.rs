// ABOUTME: Environment metadata trait plus the Linux container conventions.
// ABOUTME: Paths, PATH handling, and the runner context seen by workflow steps.

use super::container::ContainerOps;
use super::copy::CopyOps;
use super::exec::ExecOps;
use super::image::ImageOps;
use super::logs::LogOps;
use super::sealed::Sealed;
use super::shared_types::RunnerContext;

/// Static facts about the environment a step runs in.
pub trait EnvironmentInfo: Sealed + Send + Sync {
    /// Translate a host path into the container's path space.
    fn to_container_path(&self, path: &str) -> String;

    /// Directory holding the runner's own scripts inside the container.
    fn act_path(&self) -> String;

    fn path_variable_name(&self) -> String;

    fn default_path_variable(&self) -> String;

    fn join_path_variable(&self, paths: &[String]) -> String;

    fn is_environment_case_insensitive(&self) -> bool;

    fn runner_context(&self) -> RunnerContext;
}

/// The full contract every container variant implements.
pub trait ExecutionEnvironment:
    ContainerOps + ImageOps + CopyOps + ExecOps + LogOps + EnvironmentInfo
{
}

impl<T> ExecutionEnvironment for T where
    T: ContainerOps + ImageOps + CopyOps + ExecOps + LogOps + EnvironmentInfo
{
}

// =============================================================================
// Linux container conventions
// =============================================================================

pub(crate) const LINUX_ACT_PATH: &str = "/var/run/act";
pub(crate) const LINUX_PATH_NAME: &str = "PATH";
pub(crate) const LINUX_DEFAULT_PATH: &str =
    "/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin";
pub(crate) const LINUX_PATH_SEPARATOR: &str = ":";
pub(crate) const TOOL_CACHE: &str = "/opt/hostedtoolcache";

/// `C:\Users\me\repo` becomes `/mnt/c/Users/me/repo`; other paths pass through.
pub fn linux_container_path(path: &str) -> String {
    let bytes = path.as_bytes();
    let is_drive = bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/');
    if !is_drive {
        return path.to_string();
    }

    let drive = (bytes[0] as char).to_ascii_lowercase();
    format!("/mnt/{}/{}", drive, path[3..].replace('\\', "/"))
}

pub fn join_linux_path(paths: &[String]) -> String {
    paths.join(LINUX_PATH_SEPARATOR)
}

/// Runner architecture name (`X64`, `ARM64`, ...) for a platform string
/// like `linux/arm64`, falling back to the host architecture.
pub fn runner_arch(platform: Option<&str>) -> &'static str {
    let requested = platform
        .and_then(|p| p.split('/').nth(1))
        .and_then(arch_name);
    requested
        .or_else(|| arch_name(std::env::consts::ARCH))
        .unwrap_or("X64")
}

fn arch_name(arch: &str) -> Option<&'static str> {
    match arch {
        "amd64" | "x86_64" => Some("X64"),
        "386" | "x86" => Some("X86"),
        "arm64" | "aarch64" => Some("ARM64"),
        "arm" => Some("ARM"),
        _ => None,
    }
}

/// Runner context for a Linux job container.
pub fn linux_runner_context(platform: Option<&str>) -> RunnerContext {
    RunnerContext {
        os: "Linux".to_string(),
        arch: runner_arch(platform).to_string(),
        temp: "/tmp".to_string(),
        tool_cache: TOOL_CACHE.to_string(),
        action_path: None,
        workspace: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_paths_map_under_mnt() {
        assert_eq!(
            linux_container_path(r"C:\Users\me\My Project"),
            "/mnt/c/Users/me/My Project"
        );
        assert_eq!(linux_container_path("d:/work"), "/mnt/d/work");
        assert_eq!(linux_container_path("/home/me/repo"), "/home/me/repo");
        assert_eq!(linux_container_path("C:"), "C:");
    }

    #[test]
    fn platform_selects_arch() {
        assert_eq!(runner_arch(Some("linux/arm64")), "ARM64");
        assert_eq!(runner_arch(Some("linux/amd64")), "X64");
        assert_eq!(runner_arch(Some("linux/386")), "X86");
    }

    #[test]
    fn path_joins_with_colon() {
        let paths = vec!["/opt/bin".to_string(), "/usr/bin".to_string()];
        assert_eq!(join_linux_path(&paths), "/opt/bin:/usr/bin");
    }
}

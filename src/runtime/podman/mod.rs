// ABOUTME: Podman adapter: the shared bollard environment plus Podman-specific behaviour.
// ABOUTME: Error hints, rootless detection, and pulls through the libpod endpoint.

mod libpod;

use super::bollard::{Backend, BollardContainer};
use super::connect::{self, ConnectError, Connection};
use super::detection::RuntimeDetector;
use super::traits::{EnvironmentError, NewContainerInput};
use super::types::RuntimeType;
use async_trait::async_trait;
use std::sync::Arc;

/// Execution environment backed by a Podman service.
pub type PodmanContainer = BollardContainer<PodmanBackend>;

#[derive(Debug, Default, Clone, Copy)]
pub struct PodmanBackend;

impl PodmanContainer {
    pub fn new(input: NewContainerInput, detector: Arc<RuntimeDetector>) -> Self {
        BollardContainer::with_backend(PodmanBackend, input, detector)
    }
}

const PODMAN_INDICATORS: [&str; 4] = ["slirp4netns", "rootless", "user namespace", "podman"];

/// Whether an error message looks like a Podman-specific failure.
pub fn is_podman_specific_error(message: &str) -> bool {
    let message = message.to_lowercase();
    PODMAN_INDICATORS.iter().any(|i| message.contains(i))
}

/// Troubleshooting hint for a Podman-specific error message.
pub fn podman_error_hint(message: &str) -> &'static str {
    let message = message.to_lowercase();
    if message.contains("rootless") {
        "This may be related to rootless Podman. Try running with --privileged or check user namespace configuration."
    } else if message.contains("slirp4netns") {
        "This may be related to Podman networking. Ensure slirp4netns is installed and properly configured."
    } else if message.contains("user namespace") {
        "This may be related to user namespace mapping. Check /etc/subuid and /etc/subgid configuration."
    } else {
        "Check Podman documentation at https://podman.io/getting-started/ for troubleshooting."
    }
}

/// Whether the service reports rootless mode in its security options.
pub(crate) fn reports_rootless<S: AsRef<str>>(security_options: &[S]) -> bool {
    security_options
        .iter()
        .any(|opt| opt.as_ref().to_lowercase().contains("rootless"))
}

async fn is_rootless(conn: &Connection) -> bool {
    match conn.client().info().await {
        Ok(info) => reports_rootless(&info.security_options.unwrap_or_default()),
        Err(e) => {
            tracing::debug!("podman info failed: {}", e);
            false
        }
    }
}

/// Check that the current user has subordinate ID ranges, which rootless
/// containers need for their user namespace.
fn inspect_user_namespace(user: &str) -> Result<(), String> {
    for file in ["/etc/subuid", "/etc/subgid"] {
        let content = match std::fs::read_to_string(file) {
            Ok(content) => content,
            Err(e) => return Err(format!("cannot read {}: {}", file, e)),
        };
        if !has_subid_range(&content, user) {
            return Err(format!("no range for {} in {}", user, file));
        }
    }
    Ok(())
}

pub(crate) fn has_subid_range(content: &str, user: &str) -> bool {
    content
        .lines()
        .filter_map(|line| line.split(':').next())
        .any(|name| name == user)
}

#[async_trait]
impl Backend for PodmanBackend {
    fn runtime(&self) -> RuntimeType {
        RuntimeType::Podman
    }

    async fn connect(&self, detector: &RuntimeDetector) -> Result<Connection, ConnectError> {
        let uri = detector
            .socket_for_runtime(RuntimeType::Podman)
            .await
            .ok_or(ConnectError::SocketNotFound(RuntimeType::Podman))?;

        tracing::debug!(socket = %uri, "connecting to podman");
        let conn = connect::connect(&uri, RuntimeType::Podman).await?;

        if let Err(e) = conn.ping(detector.probe_settings().probe_timeout).await {
            conn.close().await;
            return Err(e);
        }
        Ok(conn)
    }

    fn map_create_error(&self, err: EnvironmentError) -> EnvironmentError {
        let message = err.to_string();
        if !is_podman_specific_error(&message) {
            return err;
        }
        EnvironmentError::Podman {
            hint: podman_error_hint(&message).to_string(),
            message,
        }
    }

    async fn before_start(&self, conn: &Connection) {
        if !is_rootless(conn).await {
            return;
        }
        tracing::debug!("detected rootless podman");

        if !checks_local_user_namespace(conn.is_tunnelled()) {
            return;
        }
        let user = std::env::var("USER").unwrap_or_default();
        if let Err(e) = inspect_user_namespace(&user) {
            tracing::warn!("rootless podman user namespace check failed: {}", e);
        }
    }

    async fn native_pull(
        &self,
        conn: &Connection,
        input: &NewContainerInput,
        force: bool,
    ) -> Option<Result<(), EnvironmentError>> {
        if input.has_credentials() {
            return None;
        }
        let socket = conn.unix_socket_path()?;
        Some(libpod::pull(socket, &input.image, force).await)
    }
}

/// Whether the rootless user namespace lives on this host.
///
/// Tunnelled services and macOS/Windows machine VMs keep their subid
/// ranges inside the remote or virtual host.
fn checks_local_user_namespace(tunnelled: bool) -> bool {
    cfg!(target_os = "linux") && !tunnelled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_namespace_checked_only_for_local_linux_service() {
        assert!(!checks_local_user_namespace(true));
        assert_eq!(
            checks_local_user_namespace(false),
            cfg!(target_os = "linux")
        );
    }

    #[test]
    fn recognises_podman_errors() {
        assert!(is_podman_specific_error("Error: slirp4netns failed"));
        assert!(is_podman_specific_error("ROOTLESS mode not supported"));
        assert!(is_podman_specific_error("cannot set up user namespace"));
        assert!(!is_podman_specific_error("image not found"));
    }

    #[test]
    fn hints_match_the_failure() {
        assert!(podman_error_hint("rootless netns").contains("rootless Podman"));
        assert!(podman_error_hint("slirp4netns exited").contains("slirp4netns is installed"));
        assert!(podman_error_hint("user namespace mapping").contains("/etc/subuid"));
        assert!(podman_error_hint("podman exploded").contains("https://podman.io/getting-started/"));
    }

    #[test]
    fn rewraps_create_errors_with_hint() {
        let err = PodmanBackend.map_create_error(EnvironmentError::Runtime(
            "failed to create container: slirp4netns failed".to_string(),
        ));
        let text = err.to_string();
        assert!(text.starts_with("podman container creation failed: runtime error: failed to create container: slirp4netns failed"));
        assert!(text.contains("\nHint: This may be related to Podman networking."));

        let plain = PodmanBackend.map_create_error(EnvironmentError::Runtime("no such image".into()));
        assert!(matches!(plain, EnvironmentError::Runtime(_)));
    }

    #[test]
    fn rootless_from_security_options() {
        assert!(reports_rootless(&["name=seccomp", "name=rootless"]));
        assert!(!reports_rootless(&["name=seccomp,profile=default"]));
        assert!(!reports_rootless::<&str>(&[]));
    }

    #[test]
    fn subid_ranges_by_user() {
        let content = "alice:100000:65536\nbob:165536:65536\n";
        assert!(has_subid_range(content, "bob"));
        assert!(!has_subid_range(content, "carol"));
    }
}

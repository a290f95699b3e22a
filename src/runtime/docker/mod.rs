// ABOUTME: Docker adapter: the shared bollard environment with Docker's connection rules.
// ABOUTME: Honours DOCKER_HOST (ssh:// is tunnelled) before the detected socket.

use super::bollard::{Backend, BollardContainer};
use super::connect::{self, ConnectError, Connection};
use super::detection::{ENV_DOCKER_HOST, RuntimeDetector};
use super::traits::NewContainerInput;
use super::types::RuntimeType;
use async_trait::async_trait;
use std::sync::Arc;

/// Execution environment backed by a Docker daemon.
pub type DockerContainer = BollardContainer<DockerBackend>;

#[derive(Debug, Default, Clone, Copy)]
pub struct DockerBackend;

impl DockerContainer {
    pub fn new(input: NewContainerInput, detector: Arc<RuntimeDetector>) -> Self {
        BollardContainer::with_backend(DockerBackend, input, detector)
    }
}

#[async_trait]
impl Backend for DockerBackend {
    fn runtime(&self) -> RuntimeType {
        RuntimeType::Docker
    }

    async fn connect(&self, detector: &RuntimeDetector) -> Result<Connection, ConnectError> {
        if let Some(host) = detector.env_var(ENV_DOCKER_HOST) {
            if host.starts_with("ssh://") {
                tracing::debug!(host = %host, "connecting to docker over ssh");
                return connect::connect(&host, RuntimeType::Docker).await;
            }
            return connect::connect_with_defaults(&host);
        }

        let uri = detector
            .socket_for_runtime(RuntimeType::Docker)
            .await
            .ok_or(ConnectError::SocketNotFound(RuntimeType::Docker))?;
        connect::connect(&uri, RuntimeType::Docker).await
    }
}

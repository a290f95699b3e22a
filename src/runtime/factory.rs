// ABOUTME: Builds execution environments for the selected container runtime.
// ABOUTME: Honours the process-wide test override, then the detector.

use super::bollard::Backend;
use super::connect::Connection;
use super::container::Container;
use super::detection::RuntimeDetector;
use super::docker::{DockerBackend, DockerContainer};
use super::error::RuntimeError;
use super::null::NullContainer;
use super::podman::{PodmanBackend, PodmanContainer};
use super::traits::{EnvironmentError, NewContainerInput};
use super::types::{Resolution, ResolutionSource, RuntimeType};
use parking_lot::RwLock;
use std::sync::Arc;

static RUNTIME_OVERRIDE: RwLock<RuntimeType> = parking_lot::const_rwlock(RuntimeType::Unknown);

/// Force every factory to report `runtime` until cleared. `Unknown` clears.
///
/// Meant for tests; the override is process-wide.
pub fn set_runtime_override(runtime: RuntimeType) {
    *RUNTIME_OVERRIDE.write() = runtime;
    tracing::debug!(component = "container-factory", runtime = %runtime, "runtime override set");
}

pub fn clear_runtime_override() {
    set_runtime_override(RuntimeType::Unknown);
}

/// The active override, if any.
pub fn runtime_override() -> Option<RuntimeType> {
    let runtime = *RUNTIME_OVERRIDE.read();
    runtime.is_known().then_some(runtime)
}

/// Restores the previous override when dropped.
#[must_use = "the override is restored as soon as the guard is dropped"]
#[derive(Debug)]
pub struct OverrideGuard {
    previous: RuntimeType,
}

impl OverrideGuard {
    pub fn set(runtime: RuntimeType) -> Self {
        let previous = std::mem::replace(&mut *RUNTIME_OVERRIDE.write(), runtime);
        Self { previous }
    }
}

impl Drop for OverrideGuard {
    fn drop(&mut self) {
        *RUNTIME_OVERRIDE.write() = self.previous;
    }
}

/// Hands out [`Container`]s. Never fails: when no runtime is usable the
/// handle is a null adapter carrying the diagnostic report.
#[derive(Debug, Clone)]
pub struct ContainerFactory {
    detector: Arc<RuntimeDetector>,
}

impl ContainerFactory {
    pub fn new(detector: Arc<RuntimeDetector>) -> Self {
        Self { detector }
    }

    /// Factory over the process-wide detector.
    pub fn global() -> Self {
        Self::new(RuntimeDetector::global())
    }

    pub fn detector(&self) -> &Arc<RuntimeDetector> {
        &self.detector
    }

    /// Which runtime new containers would use, and why.
    pub async fn resolution(&self) -> Resolution {
        if let Some(runtime) = runtime_override() {
            return Resolution::new(runtime, ResolutionSource::Override);
        }
        self.detector.detect().await
    }

    pub async fn current_runtime(&self) -> RuntimeType {
        self.resolution().await.runtime
    }

    /// Container on the auto-selected runtime.
    pub async fn new_container(&self, input: NewContainerInput) -> Container {
        let runtime = self.current_runtime().await;
        tracing::debug!(
            component = "container-factory",
            runtime = %runtime,
            forced = false,
            image = %input.image,
            "creating container"
        );
        self.build(runtime, input, None)
    }

    /// Container on `runtime`, which must verify first.
    pub async fn new_container_with_runtime(
        &self,
        input: NewContainerInput,
        runtime: RuntimeType,
    ) -> Container {
        if !runtime.is_known() || !self.detector.verify_runtime(runtime).await {
            tracing::error!(
                component = "container-factory",
                runtime = %runtime,
                forced = true,
                "requested container runtime is not available"
            );
            return Container::Null(NullContainer::forced(
                input,
                Arc::clone(&self.detector),
                runtime,
            ));
        }

        tracing::debug!(
            component = "container-factory",
            runtime = %runtime,
            forced = true,
            image = %input.image,
            "creating container"
        );
        self.build(runtime, input, Some(runtime))
    }

    fn build(
        &self,
        runtime: RuntimeType,
        input: NewContainerInput,
        forced: Option<RuntimeType>,
    ) -> Container {
        let detector = Arc::clone(&self.detector);
        match runtime {
            RuntimeType::Docker => Container::Docker(DockerContainer::new(input, detector)),
            RuntimeType::Podman => Container::Podman(PodmanContainer::new(input, detector)),
            _ => {
                tracing::warn!(
                    component = "container-factory",
                    forced = forced.is_some(),
                    "no container runtime available, using null adapter"
                );
                Container::Null(NullContainer::unavailable(input, detector))
            }
        }
    }

    /// Every runtime that currently verifies. Possibly empty.
    pub async fn available_runtimes(&self) -> Vec<RuntimeType> {
        self.detector.available_runtimes().await
    }

    /// The diagnostic report explaining why no runtime is usable.
    pub async fn detection_error(&self) -> String {
        self.detector.diagnostic_report().await
    }

    /// A connected client for the selected runtime.
    pub async fn container_client(&self) -> Result<Connection, RuntimeError> {
        let runtime = self.current_runtime().await;
        tracing::debug!(component = "container-factory", runtime = %runtime, "opening runtime client");

        let conn = match runtime {
            RuntimeType::Docker => DockerBackend.connect(&self.detector).await?,
            RuntimeType::Podman => PodmanBackend.connect(&self.detector).await?,
            _ => {
                let report = self.detection_error().await;
                return Err(EnvironmentError::Unavailable { report }.into());
            }
        };
        Ok(conn)
    }
}

// ABOUTME: Container runtime resolution and the execution environments built on it.
// ABOUTME: Detector, factory, Docker/Podman/null adapters, and the capability traits.

pub mod bollard;
pub mod candidates;
pub mod connect;
mod container;
pub mod detection;
pub mod docker;
pub mod envfile;
mod error;
mod factory;
pub mod ignore;
mod null;
pub mod podman;
pub mod probe;
pub mod traits;
mod types;

pub use self::bollard::{Backend, BollardContainer};
pub use connect::{ConnectError, Connection};
pub use container::Container;
pub use detection::{DetectionStatus, EnvLookup, RuntimeDetector, check_environment_hints};
pub use docker::{DockerBackend, DockerContainer};
pub use error::{RuntimeError, RuntimeErrorKind};
pub use factory::{
    ContainerFactory, OverrideGuard, clear_runtime_override, runtime_override,
    set_runtime_override,
};
pub use null::NullContainer;
pub use podman::{PodmanBackend, PodmanContainer, is_podman_specific_error, podman_error_hint};
pub use probe::{Prober, SystemProber};
pub use types::{
    DetectorConfig, ParseRuntimeError, ProbeSettings, Resolution, ResolutionSource,
    ResolvedSocket, RuntimeType, SocketCandidate, socket_uri,
};
pub use traits::{
    ArchiveStream, ContainerOps, CopyOps, EnvironmentError, EnvironmentInfo, ExecOps,
    ExecutionEnvironment, FileEntry, Health, ImageOps, LogOps, LogWriter, NewContainerInput,
    RunnerContext, TarReader,
};

// ABOUTME: Configuration file for act-container (act-container.yml).
// ABOUTME: YAML parsing, discovery, and layering of CLI flags over file values.

mod deserialize;

use deserialize::{deserialize_runtime, deserialize_socket};

use crate::error::{Error, Result};
use crate::runtime::{DetectorConfig, ProbeSettings, RuntimeType};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "act-container.yml";
pub const CONFIG_FILENAME_HIDDEN: &str = ".act-container.yml";

/// Runtime selection settings. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// `docker`, `podman` or `auto`.
    #[serde(default, deserialize_with = "deserialize_runtime")]
    pub runtime: RuntimeType,

    #[serde(default, deserialize_with = "deserialize_socket")]
    pub socket: Option<String>,

    #[serde(default = "default_probe_timeout", with = "humantime_serde")]
    pub probe_timeout: Duration,

    #[serde(default = "default_machine_timeout", with = "humantime_serde")]
    pub machine_timeout: Duration,

    /// Reuse a verified detection for this long. Unset disables caching.
    #[serde(default, with = "humantime_serde")]
    pub cache_ttl: Option<Duration>,

    /// Ask `podman machine` for its socket. Defaults to on for macOS.
    #[serde(default)]
    pub machine_lookup: Option<bool>,
}

fn default_probe_timeout() -> Duration {
    ProbeSettings::default().probe_timeout
}

fn default_machine_timeout() -> Duration {
    ProbeSettings::default().machine_timeout
}

impl Default for Config {
    fn default() -> Self {
        Self {
            runtime: RuntimeType::Unknown,
            socket: None,
            probe_timeout: default_probe_timeout(),
            machine_timeout: default_machine_timeout(),
            cache_ttl: None,
            machine_lookup: None,
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load the first config file found in `dir`, if any.
    pub fn discover(dir: &Path) -> Result<Option<Self>> {
        let candidates = [dir.join(CONFIG_FILENAME), dir.join(CONFIG_FILENAME_HIDDEN)];

        for path in &candidates {
            if path.is_file() {
                tracing::debug!(path = %path.display(), "loading config");
                return Self::load(path).map(Some);
            }
        }

        Ok(None)
    }

    /// An explicit path must exist; otherwise discover in `dir`, else defaults.
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        match explicit {
            Some(path) if !path.is_file() => Err(Error::ConfigNotFound(path.to_path_buf())),
            Some(path) => Self::load(path),
            None => Ok(Self::discover(dir)?.unwrap_or_default()),
        }
    }

    /// Layer command-line flags over file values.
    pub fn with_overrides(mut self, runtime: Option<RuntimeType>, socket: Option<String>) -> Self {
        if let Some(runtime) = runtime {
            self.runtime = runtime;
        }
        if let Some(socket) = socket.filter(|s| !s.is_empty()) {
            self.socket = Some(socket);
        }
        self
    }

    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            preferred: self.runtime,
            custom_socket: self.socket.clone(),
            cache_ttl: self.cache_ttl,
        }
    }

    pub fn probe_settings(&self) -> ProbeSettings {
        let defaults = ProbeSettings::default();
        ProbeSettings {
            probe_timeout: self.probe_timeout,
            machine_timeout: self.machine_timeout,
            machine_lookup: self.machine_lookup.unwrap_or(defaults.machine_lookup),
        }
    }
}

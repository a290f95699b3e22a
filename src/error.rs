// ABOUTME: Application-wide error types for act-container.
// ABOUTME: Uses thiserror for ergonomic error handling.

use crate::runtime::{EnvironmentError, RuntimeError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error("no socket found for {0}")]
    NoSocket(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

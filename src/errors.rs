// src/errors.rs

//! Crate-wide error aliases and helpers.

use thiserror::Error;

use crate::runner::RunnerError;

#[derive(Error, Debug)]
pub enum ProcrunError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ProcrunError>;

// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{RawRunFile, RunFile};
use crate::errors::Result;

/// Load a run file from a given path and return the raw `RawRunFile`.
///
/// This only performs TOML deserialization; it does **not** validate runner
/// settings or commands. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawRunFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let raw: RawRunFile = toml::from_str(&contents)?;

    Ok(raw)
}

/// Load a run file from path and validate it.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks `max_processes >= 1`, a finite non-negative `max_run_time`, and
///   non-empty commands.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<RunFile> {
    let raw = load_from_path(&path)?;
    let file = RunFile::try_from(raw)?;
    Ok(file)
}

/// Run file picked up from the working directory when `--config` is not
/// given (only if it exists).
pub fn default_run_file_path() -> PathBuf {
    PathBuf::from("Procrun.toml")
}

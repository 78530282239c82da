// src/config/mod.rs

//! Run-file loading and validation.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a run file from disk (`loader.rs`).
//! - Validate runner settings and commands (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_run_file_path, load_and_validate, load_from_path};
pub use model::{CommandEntry, RawRunFile, ReportSection, RunFile, RunnerSection};
pub use validate::{validate_commands, validate_max_processes, validate_max_run_time};

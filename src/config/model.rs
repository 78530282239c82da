// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::types::ReportFormat;

/// Run file as read from TOML, before validation.
///
/// ```toml
/// [runner]
/// max_processes = 4
/// max_run_time = 2.5
///
/// [report]
/// format = "json"
///
/// [[command]]
/// cmd = "echo hello"
///
/// [[command]]
/// cmd = "sleep 10"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRunFile {
    #[serde(default)]
    pub runner: RunnerSection,

    #[serde(default)]
    pub report: ReportSection,

    /// Commands from `[[command]]`, in file order.
    #[serde(default)]
    pub command: Vec<CommandEntry>,
}

/// `[runner]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RunnerSection {
    /// Number of processes allowed to run at once. Must be >= 1.
    #[serde(default = "default_max_processes")]
    pub max_processes: usize,

    /// Per-process timeout in seconds (fractions allowed). `0` = unlimited.
    #[serde(default)]
    pub max_run_time: f64,
}

fn default_max_processes() -> usize {
    1
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            max_processes: default_max_processes(),
            max_run_time: 0.0,
        }
    }
}

/// `[report]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportSection {
    #[serde(default)]
    pub format: ReportFormat,
}

/// One `[[command]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandEntry {
    /// Shell command line to execute.
    pub cmd: String,
}

/// Validated run file.
///
/// Only constructible through `TryFrom<RawRunFile>` (see `validate.rs`).
#[derive(Debug, Clone)]
pub struct RunFile {
    pub max_processes: usize,
    /// `Duration::ZERO` = unlimited.
    pub max_run_time: Duration,
    pub format: ReportFormat,
    pub commands: Vec<String>,
}

impl RunFile {
    pub(crate) fn new_unchecked(
        max_processes: usize,
        max_run_time: Duration,
        format: ReportFormat,
        commands: Vec<String>,
    ) -> Self {
        Self {
            max_processes,
            max_run_time,
            format,
            commands,
        }
    }
}

impl Default for RunFile {
    fn default() -> Self {
        Self::new_unchecked(1, Duration::ZERO, ReportFormat::Text, Vec::new())
    }
}

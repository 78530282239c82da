// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::ReportFormat;

/// Command-line arguments for `procrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "procrun",
    version,
    about = "Run commands with bounded parallelism, killing any that overrun.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to a run file (TOML).
    ///
    /// Default: `Procrun.toml` in the current working directory, if present.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Number of commands allowed to run at the same time.
    #[arg(short = 'j', long, value_name = "N")]
    pub max_processes: Option<usize>,

    /// Kill any command running longer than this many seconds (0 = never).
    #[arg(short = 't', long, value_name = "SECS", allow_negative_numbers = true)]
    pub max_run_time: Option<f64>,

    /// Report format.
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub format: Option<ReportFormat>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PROCRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Validate and print the plan, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Commands to run, appended after those from the run file.
    #[arg(value_name = "COMMAND")]
    pub commands: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

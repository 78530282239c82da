// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{RawRunFile, RunFile};
use crate::errors::{ProcrunError, Result};
use crate::runner::duration_from_secs;

impl TryFrom<RawRunFile> for RunFile {
    type Error = ProcrunError;

    fn try_from(raw: RawRunFile) -> std::result::Result<Self, Self::Error> {
        let max_processes = validate_max_processes(raw.runner.max_processes)?;
        let max_run_time = validate_max_run_time(raw.runner.max_run_time)?;
        let commands: Vec<String> = raw.command.into_iter().map(|c| c.cmd).collect();
        validate_commands(&commands)?;

        Ok(RunFile::new_unchecked(
            max_processes,
            max_run_time,
            raw.report.format,
            commands,
        ))
    }
}

/// `max_processes` must be at least 1.
pub fn validate_max_processes(max_processes: usize) -> Result<usize> {
    if max_processes == 0 {
        return Err(ProcrunError::ConfigError(
            "max_processes must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(max_processes)
}

/// `max_run_time` must be finite and non-negative; `0` disables the timeout.
pub fn validate_max_run_time(seconds: f64) -> Result<Duration> {
    duration_from_secs(seconds).map_err(|_| {
        ProcrunError::ConfigError(format!(
            "max_run_time must be a finite number of seconds >= 0 (got {seconds})"
        ))
    })
}

/// Every command must contain something besides whitespace. Positions in the
/// message are 1-based.
pub fn validate_commands(commands: &[String]) -> Result<()> {
    for (i, cmd) in commands.iter().enumerate() {
        if cmd.trim().is_empty() {
            return Err(ProcrunError::ConfigError(format!(
                "command #{} is empty",
                i + 1
            )));
        }
    }
    Ok(())
}

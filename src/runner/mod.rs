// src/runner/mod.rs

//! Bounded-parallelism process runner.
//!
//! - [`record`] holds the per-process bookkeeping (`ProcessRecord`).
//! - [`schedule`] contains the admission/poll loop (`Runner::run`) and the
//!   one-shot `Runner::run_command`.
//! - [`search`] implements lookup by index and by command text.

pub mod record;
pub mod schedule;
pub mod search;

use std::time::Duration;

use thiserror::Error;

use crate::process::{ProcessError, ProcessHandle, SystemProcess};

pub use record::{OutputEntry, ProcessRecord, RecordState};
pub use schedule::{KILL_NOTICE, POLL_INTERVAL, RunStats};

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("invalid index: {index} (have {len} processes)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("max processes must be at least 1 (got {0})")]
    InvalidMaxProcesses(usize),

    #[error("max run time must be a finite, non-negative number of seconds (got {0})")]
    InvalidMaxRunTime(f64),

    #[error("invalid command pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("failed to start process #{index} ('{command}'): {source}")]
    Start {
        index: usize,
        command: String,
        #[source]
        source: ProcessError,
    },
}

/// Runs submitted processes, at most `max_processes` at a time, killing any
/// that exceed `max_run_time`.
#[derive(Debug)]
pub struct Runner {
    records: Vec<ProcessRecord>,
    max_processes: usize,
    /// `Duration::ZERO` means unlimited.
    max_run_time: Duration,
    stats: RunStats,
}

impl Default for Runner {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            max_processes: 1,
            max_run_time: Duration::ZERO,
            stats: RunStats::default(),
        }
    }
}

impl Runner {
    pub fn new(max_processes: usize, max_run_time: Duration) -> Result<Self, RunnerError> {
        let mut runner = Self::default();
        runner.set_max_processes(max_processes)?;
        runner.set_max_run_time(max_run_time);
        Ok(runner)
    }

    /// Set the number of processes allowed to run concurrently.
    ///
    /// `0` is rejected; the previous value is kept.
    pub fn set_max_processes(&mut self, max_processes: usize) -> Result<&mut Self, RunnerError> {
        if max_processes == 0 {
            return Err(RunnerError::InvalidMaxProcesses(max_processes));
        }
        self.max_processes = max_processes;
        Ok(self)
    }

    /// Set the per-process timeout. `Duration::ZERO` disables it.
    pub fn set_max_run_time(&mut self, max_run_time: Duration) -> &mut Self {
        self.max_run_time = max_run_time;
        self
    }

    /// Set the per-process timeout in (fractional) seconds. `0.0` disables it.
    pub fn set_max_run_time_secs(&mut self, seconds: f64) -> Result<&mut Self, RunnerError> {
        let max_run_time = duration_from_secs(seconds)?;
        Ok(self.set_max_run_time(max_run_time))
    }

    pub fn max_processes(&self) -> usize {
        self.max_processes
    }

    pub fn max_run_time(&self) -> Duration {
        self.max_run_time
    }

    /// Submit a shell command. It is not started until [`Runner::run`].
    pub fn add_command(&mut self, command: impl Into<String>) -> &mut Self {
        self.add_process(Box::new(SystemProcess::new(command)))
    }

    /// Submit a caller-built, not-yet-started handle.
    pub fn add_process(&mut self, handle: Box<dyn ProcessHandle>) -> &mut Self {
        self.records.push(ProcessRecord::new(handle));
        self
    }

    /// All records, in submission order.
    pub fn records(&self) -> &[ProcessRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ProcessRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Counters from the most recent [`Runner::run`].
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }
}

/// Convert fractional seconds into a timeout, rejecting negative or
/// non-finite values.
pub fn duration_from_secs(seconds: f64) -> Result<Duration, RunnerError> {
    Duration::try_from_secs_f64(seconds).map_err(|_| RunnerError::InvalidMaxRunTime(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_one_process_and_no_timeout() {
        let runner = Runner::default();
        assert_eq!(runner.max_processes(), 1);
        assert_eq!(runner.max_run_time(), Duration::ZERO);
        assert!(runner.is_empty());
    }

    #[test]
    fn zero_max_processes_is_rejected_and_keeps_previous_value() {
        let mut runner = Runner::new(3, Duration::ZERO).unwrap();
        let err = runner.set_max_processes(0).unwrap_err();
        assert!(matches!(err, RunnerError::InvalidMaxProcesses(0)));
        assert_eq!(runner.max_processes(), 3);

        assert!(Runner::new(0, Duration::ZERO).is_err());
    }

    #[test]
    fn max_run_time_secs_accepts_fractions_and_rejects_negatives() {
        let mut runner = Runner::default();
        runner.set_max_run_time_secs(1.5).unwrap();
        assert_eq!(runner.max_run_time(), Duration::from_millis(1500));

        runner.set_max_run_time_secs(0.0).unwrap();
        assert_eq!(runner.max_run_time(), Duration::ZERO);

        assert!(matches!(
            runner.set_max_run_time_secs(-1.0),
            Err(RunnerError::InvalidMaxRunTime(_))
        ));
        assert!(runner.set_max_run_time_secs(f64::NAN).is_err());
        assert!(runner.set_max_run_time_secs(f64::INFINITY).is_err());
    }

    #[test]
    fn submission_appends_in_order() {
        let mut runner = Runner::default();
        runner.add_command("echo a").add_command("echo b");
        runner.add_process(Box::new(SystemProcess::new("echo c")));

        let commands: Vec<_> = runner.records().iter().map(|r| r.command()).collect();
        assert_eq!(commands, vec!["echo a", "echo b", "echo c"]);
        assert_eq!(runner.len(), 3);
        assert!(runner.records().iter().all(|r| !r.has_started()));
    }
}

#![allow(dead_code)]

use std::time::Duration;

use procrun::config::{CommandEntry, RawRunFile, RunFile};
use procrun::types::ReportFormat;
use procrun::Runner;

use crate::fake_process::FakeProcess;

/// Builder for `RawRunFile` / `RunFile` to simplify test setup.
pub struct RunFileBuilder {
    raw: RawRunFile,
}

impl RunFileBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawRunFile::default(),
        }
    }

    pub fn max_processes(mut self, n: usize) -> Self {
        self.raw.runner.max_processes = n;
        self
    }

    pub fn max_run_time(mut self, secs: f64) -> Self {
        self.raw.runner.max_run_time = secs;
        self
    }

    pub fn format(mut self, format: ReportFormat) -> Self {
        self.raw.report.format = format;
        self
    }

    pub fn command(mut self, cmd: &str) -> Self {
        self.raw.command.push(CommandEntry {
            cmd: cmd.to_string(),
        });
        self
    }

    pub fn build_raw(self) -> RawRunFile {
        self.raw
    }

    pub fn build(self) -> RunFile {
        RunFile::try_from(self.raw).expect("Failed to build valid run file from builder")
    }
}

impl Default for RunFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for a `Runner` populated with fake processes.
pub struct FakeRunnerBuilder {
    max_processes: usize,
    max_run_time: Duration,
    processes: Vec<FakeProcess>,
}

impl FakeRunnerBuilder {
    pub fn new() -> Self {
        Self {
            max_processes: 1,
            max_run_time: Duration::ZERO,
            processes: Vec::new(),
        }
    }

    pub fn max_processes(mut self, n: usize) -> Self {
        self.max_processes = n;
        self
    }

    pub fn max_run_time(mut self, d: Duration) -> Self {
        self.max_run_time = d;
        self
    }

    pub fn process(mut self, p: FakeProcess) -> Self {
        self.processes.push(p);
        self
    }

    pub fn build(self) -> Runner {
        let mut runner = Runner::new(self.max_processes, self.max_run_time)
            .expect("Failed to build runner from builder");
        for p in self.processes {
            runner.add_process(p.boxed());
        }
        runner
    }
}

impl Default for FakeRunnerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

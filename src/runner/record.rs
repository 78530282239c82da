// src/runner/record.rs

//! Per-process bookkeeping: timestamps and captured output.

use std::time::{Duration, Instant, SystemTime};

use crate::process::ProcessHandle;

/// A point in time, kept both as wall-clock (for display) and monotonic
/// (for run-time arithmetic).
#[derive(Debug, Clone, Copy)]
struct Stamp {
    wall: SystemTime,
    mono: Instant,
}

impl Stamp {
    fn now() -> Self {
        Self {
            wall: SystemTime::now(),
            mono: Instant::now(),
        }
    }
}

/// One chunk of output, as observed by a single poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputEntry {
    pub time: SystemTime,
    pub text: String,
}

/// Observable lifecycle state of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    /// Not yet started.
    Pending,
    /// Started; end not yet observed.
    Running,
    /// End observed; exit code available from the handle.
    Ended,
}

/// Bookkeeping for one submitted process.
///
/// Created when a command or handle is submitted to a
/// [`Runner`](crate::runner::Runner) and mutated by its poll loop.
#[derive(Debug)]
pub struct ProcessRecord {
    handle: Box<dyn ProcessHandle>,
    started: Option<Stamp>,
    ended: Option<Stamp>,
    stdout: Vec<OutputEntry>,
    stderr: Vec<OutputEntry>,
    killed: bool,
}

impl ProcessRecord {
    pub fn new(handle: Box<dyn ProcessHandle>) -> Self {
        Self {
            handle,
            started: None,
            ended: None,
            stdout: Vec::new(),
            stderr: Vec::new(),
            killed: false,
        }
    }

    /// Stamp the start time. Does not start the handle itself.
    pub fn mark_started(&mut self) -> &mut Self {
        self.started = Some(Stamp::now());
        self
    }

    /// Stamp the end time.
    pub fn mark_ended(&mut self) -> &mut Self {
        self.ended = Some(Stamp::now());
        self
    }

    pub fn log_stdout(&mut self, text: impl Into<String>) -> &mut Self {
        self.stdout.push(OutputEntry {
            time: SystemTime::now(),
            text: text.into(),
        });
        self
    }

    pub fn log_stderr(&mut self, text: impl Into<String>) -> &mut Self {
        self.stderr.push(OutputEntry {
            time: SystemTime::now(),
            text: text.into(),
        });
        self
    }

    /// Elapsed run time.
    ///
    /// `ZERO` before the record is started, fixed once it has ended, and a
    /// live, growing estimate in between.
    pub fn run_time(&self) -> Duration {
        match (self.started, self.ended) {
            (None, _) => Duration::ZERO,
            (Some(start), Some(end)) => end.mono.saturating_duration_since(start.mono),
            (Some(start), None) => start.mono.elapsed(),
        }
    }

    pub fn start_time(&self) -> Option<SystemTime> {
        self.started.map(|s| s.wall)
    }

    pub fn end_time(&self) -> Option<SystemTime> {
        self.ended.map(|s| s.wall)
    }

    pub fn has_started(&self) -> bool {
        self.started.is_some()
    }

    pub fn has_ended(&self) -> bool {
        self.ended.is_some()
    }

    pub fn state(&self) -> RecordState {
        match (self.started, self.ended) {
            (None, _) => RecordState::Pending,
            (Some(_), None) => RecordState::Running,
            (Some(_), Some(_)) => RecordState::Ended,
        }
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.handle.exit_code()
    }

    pub fn stdout(&self) -> &[OutputEntry] {
        &self.stdout
    }

    pub fn stderr(&self) -> &[OutputEntry] {
        &self.stderr
    }

    /// The whole stdout log concatenated.
    pub fn stdout_text(&self) -> String {
        concat_entries(&self.stdout)
    }

    /// The whole stderr log concatenated.
    pub fn stderr_text(&self) -> String {
        concat_entries(&self.stderr)
    }

    /// Whether the runner had to kill this process for exceeding its timeout.
    pub fn was_killed(&self) -> bool {
        self.killed
    }

    pub fn command(&self) -> &str {
        self.handle.command()
    }

    pub fn handle(&self) -> &dyn ProcessHandle {
        self.handle.as_ref()
    }

    pub(crate) fn handle_mut(&mut self) -> &mut dyn ProcessHandle {
        self.handle.as_mut()
    }

    pub(crate) fn note_kill(&mut self) {
        self.killed = true;
    }
}

fn concat_entries(entries: &[OutputEntry]) -> String {
    entries.iter().map(|e| e.text.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::SystemProcess;
    use std::thread::sleep;

    fn record() -> ProcessRecord {
        ProcessRecord::new(Box::new(SystemProcess::new("ls")))
    }

    #[test]
    fn fresh_record_is_pending_with_zero_run_time() {
        let rec = record();
        assert_eq!(rec.state(), RecordState::Pending);
        assert_eq!(rec.run_time(), Duration::ZERO);
        assert!(rec.start_time().is_none());
        assert!(rec.end_time().is_none());
        assert!(rec.exit_code().is_none());
        assert_eq!(rec.command(), "ls");
    }

    #[test]
    fn run_time_grows_while_running() {
        let mut rec = record();
        rec.mark_started();
        sleep(Duration::from_millis(5));
        let first = rec.run_time();
        sleep(Duration::from_millis(5));
        let second = rec.run_time();

        assert!(first > Duration::ZERO);
        assert!(second > first);
        assert_eq!(rec.state(), RecordState::Running);
    }

    #[test]
    fn run_time_is_fixed_after_end() {
        let mut rec = record();
        rec.mark_started();
        sleep(Duration::from_millis(50));
        rec.mark_ended();

        let run_time = rec.run_time();
        sleep(Duration::from_millis(10));

        assert_eq!(rec.run_time(), run_time);
        assert!(run_time >= Duration::from_millis(50));
        assert!(run_time < Duration::from_secs(1));
        assert_eq!(rec.state(), RecordState::Ended);
        assert!(rec.end_time().unwrap() >= rec.start_time().unwrap());
    }

    #[test]
    fn logs_are_independent_and_ordered() {
        let mut rec = record();
        rec.log_stdout("one").log_stdout("two");
        rec.log_stderr("err");

        let out: Vec<_> = rec.stdout().iter().map(|e| e.text.as_str()).collect();
        assert_eq!(out, vec!["one", "two"]);
        assert_eq!(rec.stderr().len(), 1);
        assert_eq!(rec.stdout_text(), "onetwo");
        assert_eq!(rec.stderr_text(), "err");
        assert!(rec.stdout()[0].time <= rec.stdout()[1].time);
    }
}

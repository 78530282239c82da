use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use procrun::process::{ProcessError, ProcessHandle, Result, Signal};

/// What a fake process does during one runner poll pass.
///
/// The runner reads stdout, then stderr, then asks `is_running()`; the step
/// is consumed by `is_running()`.
#[derive(Debug, Clone, Default)]
pub struct Step {
    pub stdout: String,
    pub stderr: String,
    pub running: bool,
    /// Exit already reaped while the handle still reports running, as a real
    /// process does while its pipes drain.
    pub draining: bool,
}

impl Step {
    pub fn running() -> Self {
        Self {
            running: true,
            ..Default::default()
        }
    }

    pub fn exited() -> Self {
        Self::default()
    }

    pub fn draining() -> Self {
        Self {
            running: true,
            draining: true,
            ..Default::default()
        }
    }

    pub fn with_stdout(mut self, text: &str) -> Self {
        self.stdout = text.to_string();
        self
    }

    pub fn with_stderr(mut self, text: &str) -> Self {
        self.stderr = text.to_string();
        self
    }
}

/// Shared observations across every fake process attached to it.
#[derive(Debug, Clone, Default)]
pub struct ProbeState {
    /// Processes started and not yet observed exited.
    pub running: usize,
    /// High-water mark of `running`.
    pub max_running: usize,
    /// Commands in the order they were started.
    pub start_order: Vec<String>,
    /// Commands in the order they were first observed exited.
    pub exit_order: Vec<String>,
    /// Kill calls received (ignored ones included).
    pub kills: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Probe(Arc<Mutex<ProbeState>>);

impl Probe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ProbeState {
        self.0.lock().unwrap().clone()
    }

    fn on_start(&self, command: &str) {
        let mut s = self.0.lock().unwrap();
        s.running += 1;
        s.max_running = s.max_running.max(s.running);
        s.start_order.push(command.to_string());
    }

    fn on_exit(&self, command: &str) {
        let mut s = self.0.lock().unwrap();
        s.running -= 1;
        s.exit_order.push(command.to_string());
    }

    fn on_kill(&self) {
        self.0.lock().unwrap().kills += 1;
    }
}

/// Exit code a fake reports after being killed (128 + SIGKILL).
pub const KILLED_EXIT_CODE: i32 = 137;

/// A scripted [`ProcessHandle`] that never touches the OS.
///
/// With an empty script the process exits on the first poll.
#[derive(Debug)]
pub struct FakeProcess {
    command: String,
    script: VecDeque<Step>,
    hang: bool,
    exit_code: i32,
    fail_start: bool,
    kills_to_ignore: usize,
    started: bool,
    exited: bool,
    exit_reaped: bool,
    killed: bool,
    probe: Option<Probe>,
}

impl FakeProcess {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            script: VecDeque::new(),
            hang: false,
            exit_code: 0,
            fail_start: false,
            kills_to_ignore: 0,
            started: false,
            exited: false,
            exit_reaped: false,
            killed: false,
            probe: None,
        }
    }

    /// Append one poll step.
    pub fn step(mut self, step: Step) -> Self {
        self.script.push_back(step);
        self
    }

    /// Stay running (silently) for `polls` passes.
    pub fn running_for(mut self, polls: usize) -> Self {
        self.script.extend(std::iter::repeat_n(Step::running(), polls));
        self
    }

    /// Report an exit code but keep reporting running for `polls` passes.
    pub fn draining_for(mut self, polls: usize) -> Self {
        self.script.extend(std::iter::repeat_n(Step::draining(), polls));
        self
    }

    /// Keep running after the script is exhausted, until killed.
    pub fn hang(mut self) -> Self {
        self.hang = true;
        self
    }

    pub fn exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    /// Make `start()` fail.
    pub fn fail_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    /// Pretend the first `n` kill signals were not delivered.
    pub fn ignore_kills(mut self, n: usize) -> Self {
        self.kills_to_ignore = n;
        self
    }

    pub fn with_probe(mut self, probe: &Probe) -> Self {
        self.probe = Some(probe.clone());
        self
    }

    pub fn boxed(self) -> Box<dyn ProcessHandle> {
        Box::new(self)
    }
}

impl ProcessHandle for FakeProcess {
    fn start(&mut self) -> Result<()> {
        if self.started {
            return Err(ProcessError::AlreadyStarted);
        }
        if self.fail_start {
            return Err(ProcessError::Spawn(std::io::Error::other(
                "scripted spawn failure",
            )));
        }
        self.started = true;
        if let Some(probe) = &self.probe {
            probe.on_start(&self.command);
        }
        Ok(())
    }

    fn is_running(&mut self) -> bool {
        if !self.started {
            return false;
        }

        let step_running = match self.script.pop_front() {
            Some(step) => {
                self.exit_reaped |= step.draining;
                step.running
            }
            None => self.hang,
        };
        let running = step_running && !self.exited && !self.killed;

        if !running && !self.exited {
            self.exited = true;
            if let Some(probe) = &self.probe {
                probe.on_exit(&self.command);
            }
        }
        running
    }

    fn read_stdout(&mut self) -> String {
        if !self.started {
            return String::new();
        }
        self.script
            .front()
            .map(|s| s.stdout.clone())
            .unwrap_or_default()
    }

    fn read_stderr(&mut self) -> String {
        if !self.started {
            return String::new();
        }
        self.script
            .front()
            .map(|s| s.stderr.clone())
            .unwrap_or_default()
    }

    fn kill(&mut self, _signal: Signal) -> Result<()> {
        if !self.started {
            return Err(ProcessError::NotStarted);
        }
        if let Some(probe) = &self.probe {
            probe.on_kill();
        }
        if self.kills_to_ignore > 0 {
            self.kills_to_ignore -= 1;
            return Err(ProcessError::Signal("scripted delivery failure".into()));
        }
        self.killed = true;
        Ok(())
    }

    fn exit_code(&self) -> Option<i32> {
        if !self.exited && !self.exit_reaped {
            return None;
        }
        Some(if self.killed {
            KILLED_EXIT_CODE
        } else {
            self.exit_code
        })
    }

    fn command(&self) -> &str {
        &self.command
    }
}

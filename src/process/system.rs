// src/process/system.rs

//! Production [`ProcessHandle`] backed by `tokio::process`.

use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use tokio::process::{Child, Command};
use tracing::{debug, warn};

use super::pipe::{PipeReader, spawn_pipe};
use super::{ProcessError, ProcessHandle, Result, Signal};

/// How long an exited process may keep reporting "running" while its pipes
/// are still open (e.g. a backgrounded grandchild holding them).
pub const PIPE_DRAIN_GRACE: Duration = Duration::from_millis(250);

/// A shell command run as an OS process.
///
/// The command is run through `sh -c` (or `cmd /C` on Windows) with stdout and
/// stderr piped and stdin closed. On unix the child leads its own process
/// group so that signals reach anything it spawned.
#[derive(Debug)]
pub struct SystemProcess {
    command: String,
    started: bool,
    child: Option<Child>,
    pid: Option<u32>,
    stdout: Option<PipeReader>,
    stderr: Option<PipeReader>,
    exited_at: Option<Instant>,
    exit_code: Option<i32>,
}

impl SystemProcess {
    /// Create an unstarted handle for `command`.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            started: false,
            child: None,
            pid: None,
            stdout: None,
            stderr: None,
            exited_at: None,
            exit_code: None,
        }
    }

    /// OS process id, once spawned.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Poll the child for exit without blocking. Returns `true` once exited.
    fn poll_exit(&mut self) -> bool {
        if self.exited_at.is_some() {
            return true;
        }

        let Some(child) = self.child.as_mut() else {
            return false;
        };

        match child.try_wait() {
            Ok(Some(status)) => {
                self.exit_code = exit_code_of(status);
                self.exited_at = Some(Instant::now());
                debug!(
                    command = %self.command,
                    pid = self.pid,
                    exit_code = self.exit_code,
                    "process exited"
                );
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!(
                    command = %self.command,
                    pid = self.pid,
                    error = %e,
                    "failed to query process status; treating it as exited"
                );
                self.exited_at = Some(Instant::now());
                true
            }
        }
    }

    fn pipes_open(&self) -> bool {
        [&self.stdout, &self.stderr]
            .into_iter()
            .flatten()
            .any(|pipe| !pipe.is_closed())
    }
}

impl ProcessHandle for SystemProcess {
    fn start(&mut self) -> Result<()> {
        if self.started {
            return Err(ProcessError::AlreadyStarted);
        }
        self.started = true;

        // Spawning and the pipe pumps both need a reactor.
        tokio::runtime::Handle::try_current()
            .map_err(|e| ProcessError::Spawn(std::io::Error::other(e)))?;

        let mut cmd = shell_command(&self.command);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = cmd.spawn().map_err(ProcessError::Spawn)?;
        self.pid = child.id();

        debug!(command = %self.command, pid = self.pid, "process spawned");

        self.stdout = child
            .stdout
            .take()
            .map(|pipe| spawn_pipe("stdout", &self.command, pipe));
        self.stderr = child
            .stderr
            .take()
            .map(|pipe| spawn_pipe("stderr", &self.command, pipe));
        self.child = Some(child);

        Ok(())
    }

    fn is_running(&mut self) -> bool {
        if !self.poll_exit() {
            return self.child.is_some();
        }

        // Exited: keep reporting "running" until the pipes are drained, so the
        // runner does not lose trailing output. Bounded by the grace period.
        match self.exited_at {
            Some(at) => self.pipes_open() && at.elapsed() < PIPE_DRAIN_GRACE,
            None => false,
        }
    }

    fn read_stdout(&mut self) -> String {
        self.stdout.as_mut().map(PipeReader::drain).unwrap_or_default()
    }

    fn read_stderr(&mut self) -> String {
        self.stderr.as_mut().map(PipeReader::drain).unwrap_or_default()
    }

    fn kill(&mut self, signal: Signal) -> Result<()> {
        if !self.started {
            return Err(ProcessError::NotStarted);
        }

        #[cfg(unix)]
        {
            if let Some(pid) = self.pid {
                return signal_group(pid, signal);
            }
        }

        let _ = signal;
        match self.child.as_mut() {
            Some(child) if self.exited_at.is_none() => child
                .start_kill()
                .map_err(|e| ProcessError::Signal(e.to_string())),
            _ => Ok(()),
        }
    }

    fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    fn command(&self) -> &str {
        &self.command
    }
}

/// Build a shell command appropriate for the platform.
fn shell_command(command: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command);
        c
    }
}

/// Natural exit code, or `128 + signal` for a signalled process on unix.
fn exit_code_of(status: ExitStatus) -> Option<i32> {
    if let Some(code) = status.code() {
        return Some(code);
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Some(128 + signal);
        }
    }

    None
}

#[cfg(unix)]
fn signal_group(pid: u32, signal: Signal) -> Result<()> {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal as NixSignal, killpg};
    use nix::unistd::Pid;

    let sig = match signal {
        Signal::Terminate => NixSignal::SIGTERM,
        Signal::Kill => NixSignal::SIGKILL,
    };

    let pgid = i32::try_from(pid).map_err(|e| ProcessError::Signal(e.to_string()))?;

    match killpg(Pid::from_raw(pgid), sig) {
        Ok(()) => Ok(()),
        // Group already gone: nothing left to signal.
        Err(Errno::ESRCH) => Ok(()),
        Err(e) => Err(ProcessError::Signal(e.to_string())),
    }
}

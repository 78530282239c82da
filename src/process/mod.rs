// src/process/mod.rs

//! Process handle abstraction.
//!
//! The runner never touches OS processes directly. It talks to a
//! [`ProcessHandle`], which makes it easy to swap in a scripted handle in
//! tests while keeping the production implementation in [`system`].
//!
//! - [`system`] provides `SystemProcess`, backed by `tokio::process`.
//! - [`pipe`] pumps child pipes into channels so reads never block.

pub mod pipe;
pub mod system;

use std::fmt::Debug;

use thiserror::Error;

pub use system::SystemProcess;

/// Signal delivered by [`ProcessHandle::kill`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Polite termination request (`SIGTERM` on unix).
    Terminate,
    /// Forceful kill (`SIGKILL` on unix). This is what timeouts use.
    Kill,
}

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("process has already been started")]
    AlreadyStarted,

    #[error("process has not been started")]
    NotStarted,

    #[error("failed to spawn process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("failed to deliver signal: {0}")]
    Signal(String),
}

pub type Result<T> = std::result::Result<T, ProcessError>;

/// One spawnable OS process, as seen by the runner.
///
/// Every method must return promptly. In particular the read methods return
/// whatever output is available *right now* (possibly an empty string); a
/// blocking implementation stalls the whole runner loop.
pub trait ProcessHandle: Send + Debug {
    /// Begin execution. Callable exactly once per handle.
    fn start(&mut self) -> Result<()>;

    /// Non-blocking liveness check.
    fn is_running(&mut self) -> bool;

    /// Newly available stdout text, or `""` if there is none.
    fn read_stdout(&mut self) -> String;

    /// Newly available stderr text, or `""` if there is none.
    fn read_stderr(&mut self) -> String;

    /// Request termination. Safe to call repeatedly.
    fn kill(&mut self, signal: Signal) -> Result<()>;

    /// Exit status once the process has exited; `None` before that.
    fn exit_code(&self) -> Option<i32>;

    /// The original command text.
    fn command(&self) -> &str;
}

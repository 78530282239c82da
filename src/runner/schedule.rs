// src/runner/schedule.rs

//! The admission / poll loop.
//!
//! Each record admitted to the active set moves through
//! `Running -> EndDetected -> (reaped)`:
//!
//! - `Running`: started, handle still reports running. Output is drained and
//!   the timeout is enforced on every pass.
//! - `EndDetected`: the handle reported "not running" for the first time.
//!   The end time is stamped, and the record stays active for exactly one
//!   more pass so output produced right at exit is still drained.
//! - reaped: "not running" observed again; the record leaves the active set.
//!
//! The loop is single-threaded; parallelism comes from the OS processes
//! themselves.

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::record::ProcessRecord;
use super::{Runner, RunnerError};
use crate::process::Signal;

/// Notice appended to a record's stderr log each time it is killed.
pub const KILL_NOTICE: &str = "Killing process\n";

/// Delay after a pass that observed nothing new.
pub const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Counters collected during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Number of poll passes.
    pub passes: u64,
    /// Largest active set observed.
    pub peak_active: usize,
    /// Number of records started.
    pub started: usize,
    /// Number of kill signals sent (re-sends included).
    pub kills_sent: u64,
}

/// Per-record state inside the active set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActiveState {
    Running,
    EndDetected,
}

/// What a single poll of one record did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PollOutcome {
    Quiet,
    Output,
    EndDetected,
    Reaped,
    KillSent,
}

impl PollOutcome {
    fn is_progress(self) -> bool {
        matches!(
            self,
            PollOutcome::Output | PollOutcome::EndDetected | PollOutcome::Reaped
        )
    }
}

impl Runner {
    /// Run every submitted, not-yet-started process to completion.
    ///
    /// Processes start in submission order whenever a slot is free. Returns
    /// once each of them has been observed ended and drained one pass past
    /// that.
    ///
    /// A handle that fails to start is marked ended and stops admission;
    /// processes already active are still polled to completion before the
    /// run returns [`RunnerError::Start`].
    pub async fn run(&mut self) -> Result<(), RunnerError> {
        let total = self.records.len();
        let max_processes = self.max_processes;
        let max_run_time = self.max_run_time;

        let mut cursor = 0usize;
        let mut active: BTreeMap<usize, ActiveState> = BTreeMap::new();
        let mut failure: Option<RunnerError> = None;
        self.stats = Default::default();

        info!(
            total,
            max_processes,
            max_run_time = ?max_run_time,
            "runner started"
        );

        loop {
            cursor = self.next_pending(cursor);
            let admitting = failure.is_none() && cursor < total;
            if !admitting && active.is_empty() {
                break;
            }

            let mut progressed = false;

            if admitting && active.len() < max_processes {
                match self.admit(cursor) {
                    Ok(()) => {
                        active.insert(cursor, ActiveState::Running);
                    }
                    Err(e) => {
                        warn!(
                            index = cursor,
                            active = active.len(),
                            error = %e,
                            "start failed; draining active processes"
                        );
                        failure = Some(e);
                    }
                }
                cursor += 1;
                progressed = true;
            }

            self.stats.passes += 1;
            self.stats.peak_active = self.stats.peak_active.max(active.len());

            let records = &mut self.records;
            let stats = &mut self.stats;
            active.retain(|&index, state| {
                let outcome = poll_active(index, &mut records[index], state, max_run_time);
                if outcome == PollOutcome::KillSent {
                    stats.kills_sent += 1;
                }
                progressed |= outcome.is_progress();
                outcome != PollOutcome::Reaped
            });

            debug!(
                pass = self.stats.passes,
                active = active.len(),
                cursor,
                "poll pass complete"
            );

            if progressed {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        }

        info!(
            passes = self.stats.passes,
            started = self.stats.started,
            peak_active = self.stats.peak_active,
            kills_sent = self.stats.kills_sent,
            "runner finished"
        );

        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Run a single command to completion and return its record.
    pub async fn run_command(
        command: impl Into<String>,
        max_run_time: Duration,
    ) -> Result<ProcessRecord, RunnerError> {
        let mut runner = Runner::new(1, max_run_time)?;
        runner.add_command(command);
        runner.run().await?;

        runner
            .into_records()
            .into_iter()
            .next()
            .ok_or(RunnerError::IndexOutOfRange { index: 0, len: 0 })
    }

    /// First index at or after `from` whose record has not been started.
    fn next_pending(&self, from: usize) -> usize {
        self.records[from.min(self.records.len())..]
            .iter()
            .position(|r| !r.has_started())
            .map_or(self.records.len(), |offset| from + offset)
    }

    fn admit(&mut self, index: usize) -> Result<(), RunnerError> {
        let record = &mut self.records[index];
        record.mark_started();
        if let Err(source) = record.handle_mut().start() {
            // Nothing is running for it; close the record out.
            record.mark_ended();
            return Err(RunnerError::Start {
                index,
                command: record.command().to_string(),
                source,
            });
        }

        self.stats.started += 1;
        info!(index, command = %record.command(), "process started");
        Ok(())
    }
}

/// Drain output from one active record, then advance its state or enforce
/// the timeout.
fn poll_active(
    index: usize,
    record: &mut ProcessRecord,
    state: &mut ActiveState,
    max_run_time: Duration,
) -> PollOutcome {
    let mut outcome = PollOutcome::Quiet;

    let out = record.handle_mut().read_stdout();
    if !out.is_empty() {
        record.log_stdout(out);
        outcome = PollOutcome::Output;
    }

    let err = record.handle_mut().read_stderr();
    if !err.is_empty() {
        record.log_stderr(err);
        outcome = PollOutcome::Output;
    }

    if !record.handle_mut().is_running() {
        return match *state {
            ActiveState::Running => {
                record.mark_ended();
                *state = ActiveState::EndDetected;
                info!(
                    index,
                    command = %record.command(),
                    exit_code = record.exit_code(),
                    run_time = ?record.run_time(),
                    "process ended"
                );
                PollOutcome::EndDetected
            }
            ActiveState::EndDetected => {
                debug!(index, command = %record.command(), "process reaped");
                PollOutcome::Reaped
            }
        };
    }

    // A handle that already reports an exit code is only flushing output.
    let exited = record.exit_code().is_some();
    if !exited && !max_run_time.is_zero() && record.run_time() > max_run_time {
        if !record.was_killed() {
            warn!(
                index,
                command = %record.command(),
                run_time = ?record.run_time(),
                max_run_time = ?max_run_time,
                "process exceeded max run time; killing"
            );
        }
        record.log_stderr(KILL_NOTICE);
        record.note_kill();
        if let Err(e) = record.handle_mut().kill(Signal::Kill) {
            warn!(
                index,
                command = %record.command(),
                error = %e,
                "failed to kill process; will retry next pass"
            );
        }
        return PollOutcome::KillSent;
    }

    outcome
}

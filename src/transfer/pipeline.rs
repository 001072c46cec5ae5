//! Dump piped straight into load
//!
//! The dump tool's stdout is the load tool's stdin; nothing touches disk
//! except the dump's stderr capture. The transfer cannot be undone or
//! resumed. Exit codes of both tools are authoritative; a non-empty stderr
//! capture is only reported.

use std::fs::{self, File};
use std::path::PathBuf;
use std::process::{Child, ExitStatus, Stdio};

use serde::Serialize;

use crate::observability::{log_event_with_fields, warn_event, Event, ObservationScope};
use crate::server::{statements, ServerHandle};

use super::capture::CapturePath;
use super::command::{DumpCommand, LoadCommand};
use super::errors::{TransferError, TransferResult};

/// Everything one transfer needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    pub dump: DumpCommand,
    pub load: LoadCommand,
    pub capture: CapturePath,
}

/// Result of a completed transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferOutcome {
    /// Dump stderr capture, kept for the operator
    pub capture_path: PathBuf,
    /// Capture is non-empty
    pub had_error_output: bool,
}

/// Moves data from the dump tool into the load tool
pub trait DataTransfer {
    fn run(&mut self, plan: &TransferPlan) -> TransferResult<TransferOutcome>;
}

/// Production transfer over an OS pipe between two child processes
#[derive(Debug, Default)]
pub struct PipeTransfer;

impl PipeTransfer {
    pub fn new() -> Self {
        Self
    }
}

impl DataTransfer for PipeTransfer {
    fn run(&mut self, plan: &TransferPlan) -> TransferResult<TransferOutcome> {
        let capture_path = plan.capture.path().to_path_buf();
        let capture =
            File::create(&capture_path).map_err(|e| TransferError::capture(&capture_path, e))?;

        let dump_name = plan.dump.program.display().to_string();
        let load_name = plan.load.program.display().to_string();

        let mut dump = plan
            .dump
            .command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::from(capture))
            .spawn()
            .map_err(|e| TransferError::spawn(&dump_name, e))?;

        let dump_out = match dump.stdout.take() {
            Some(out) => out,
            None => {
                abandon(&mut dump);
                return Err(TransferError::pipe("dump stdout was not captured"));
            }
        };

        let mut load = match plan.load.command().stdin(Stdio::from(dump_out)).spawn() {
            Ok(child) => child,
            Err(e) => {
                abandon(&mut dump);
                return Err(TransferError::spawn(&load_name, e));
            }
        };

        let load_status = match load.wait() {
            Ok(status) => status,
            Err(e) => {
                abandon(&mut dump);
                return Err(TransferError::wait(&load_name, e));
            }
        };
        let dump_status = dump.wait().map_err(|e| TransferError::wait(&dump_name, e))?;

        // A load that stops reading kills the dump with SIGPIPE
        if !load_status.success() && (dump_status.success() || broken_pipe(&dump_status)) {
            return Err(TransferError::load_failed(load_status, Some(dump_status)));
        }
        if !dump_status.success() {
            return Err(TransferError::dump_failed(dump_status));
        }

        let captured = fs::metadata(&capture_path)
            .map_err(|e| TransferError::capture(&capture_path, e))?
            .len();

        Ok(TransferOutcome {
            capture_path,
            had_error_output: captured > 0,
        })
    }
}

#[cfg(unix)]
const SIGPIPE: i32 = 13;

/// Exit of a writer whose reader went away, either killed by the signal or
/// reported by a shell as 128 + SIGPIPE.
#[cfg(unix)]
fn broken_pipe(status: &ExitStatus) -> bool {
    use std::os::unix::process::ExitStatusExt;

    status.signal() == Some(SIGPIPE) || status.code() == Some(128 + SIGPIPE)
}

#[cfg(not(unix))]
fn broken_pipe(_status: &ExitStatus) -> bool {
    false
}

fn abandon(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Run one transfer into `destination`.
///
/// A destination in GTID mode has its GTID history reset first so the
/// incoming dump's history does not collide with it.
pub fn transfer(
    runner: &mut dyn DataTransfer,
    destination: &mut dyn ServerHandle,
    plan: &TransferPlan,
) -> TransferResult<TransferOutcome> {
    if destination.gtid_mode() {
        let statement = statements::reset_gtid_state(destination.version());
        destination
            .execute(statement)
            .map_err(|e| TransferError::gtid_reset(e.to_string()))?;
        log_event_with_fields(
            Event::GtidStateReset,
            &[("server", destination.name()), ("statement", statement)],
        );
    }

    let capture = plan.capture.path().display().to_string();
    let scope = ObservationScope::with_fields(
        "DUMP_LOAD",
        &[("destination", destination.name()), ("capture", &capture)],
    );

    let outcome = match runner.run(plan) {
        Ok(outcome) => outcome,
        Err(e) => {
            scope.fail(&e.to_string());
            return Err(e);
        }
    };

    let had_error_output = outcome.had_error_output.to_string();
    scope.complete_with_fields(&[("had_error_output", &had_error_output)]);

    if outcome.had_error_output {
        warn_event(Event::DumpStderrCaptured, &[("path", &capture)]);
    }

    Ok(outcome)
}

//! What a completed run did

use serde::Serialize;

use crate::replication::{Diagnostic, LinkAction, VerificationReport, WaitOutcome};
use crate::transfer::TransferOutcome;

/// Whether the destination ends up as a replica
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloneMode {
    Standalone,
    Replica,
}

/// Summary of a run that reached DONE
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CloneReport {
    pub mode: CloneMode,
    pub source: String,
    pub destination: String,
    pub link_action: LinkAction,
    /// Dump arguments with any password masked
    pub dump_args: Vec<String>,
    /// Advisory requirement diagnostics
    pub warnings: Vec<Diagnostic>,
    pub transfer: TransferOutcome,
    /// Set when a session was re-opened after the transfer
    pub reconnected: bool,
    pub wait: Option<WaitOutcome>,
    pub verification: Option<VerificationReport>,
}

impl CloneReport {
    /// Replication is healthy, or was not requested
    pub fn is_healthy(&self) -> bool {
        self.verification
            .as_ref()
            .map(VerificationReport::is_healthy)
            .unwrap_or(true)
    }
}

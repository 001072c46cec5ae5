//! Replication Error Types
//!
//! Every error here is raised before the dump/load transfer starts or while
//! wiring the replica afterwards. Verifier findings are not errors.

use std::fmt;

use super::validator::Diagnostic;

/// Replication error type
#[derive(Debug, Clone)]
pub struct ReplicationError {
    /// Error kind
    pub kind: ReplicationErrorKind,
    /// Error message
    pub message: String,
    /// Itemized requirement diagnostics, if any
    pub diagnostics: Vec<Diagnostic>,
}

/// Replication error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicationErrorKind {
    /// A required server variable is missing or wrong on either role
    RequirementMismatch,

    /// Replication requested from a source addressed through loopback
    LoopbackSource,

    /// Replication requested between servers with different GTID modes
    GtidModeMismatch,

    /// Replication requested but the source has no replication account
    MissingCredentials,

    /// A statement changing the replication link failed
    LinkStatementFailed,
}

impl ReplicationErrorKind {
    /// Error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::RequirementMismatch => "DBCLONE_REPL_REQUIREMENT_MISMATCH",
            Self::LoopbackSource => "DBCLONE_REPL_LOOPBACK_SOURCE",
            Self::GtidModeMismatch => "DBCLONE_REPL_GTID_MODE_MISMATCH",
            Self::MissingCredentials => "DBCLONE_REPL_MISSING_CREDENTIALS",
            Self::LinkStatementFailed => "DBCLONE_REPL_LINK_STATEMENT_FAILED",
        }
    }
}

impl ReplicationError {
    /// Create a new replication error.
    pub fn new(kind: ReplicationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            diagnostics: Vec::new(),
        }
    }

    /// Create a requirement mismatch error carrying its diagnostics.
    pub fn requirement_mismatch(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            kind: ReplicationErrorKind::RequirementMismatch,
            message: "source and/or destination replication configuration did not pass"
                .to_string(),
            diagnostics,
        }
    }

    /// Create a loopback source error.
    pub fn loopback_source(host: &str) -> Self {
        Self::new(
            ReplicationErrorKind::LoopbackSource,
            format!(
                "source host '{}' is a loopback address; use the address the replica can reach",
                host
            ),
        )
    }

    /// Create a GTID mode mismatch error.
    pub fn gtid_mode_mismatch(source: bool, destination: bool) -> Self {
        Self::new(
            ReplicationErrorKind::GtidModeMismatch,
            format!(
                "source ({}) and destination ({}) GTID modes do not match",
                on_off(source),
                on_off(destination)
            ),
        )
    }

    /// Create a missing credentials error.
    pub fn missing_credentials(source: &str) -> Self {
        Self::new(
            ReplicationErrorKind::MissingCredentials,
            format!("source {} has no replication account configured", source),
        )
    }

    /// Create a link statement failure.
    pub fn link_statement_failed(message: impl Into<String>) -> Self {
        Self::new(ReplicationErrorKind::LinkStatementFailed, message)
    }

    /// Check if this error must stop the run before the transfer.
    pub fn is_fatal(&self) -> bool {
        !matches!(self.kind, ReplicationErrorKind::LinkStatementFailed)
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "ON"
    } else {
        "OFF"
    }
}

impl fmt::Display for ReplicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.code(), self.message)?;
        for diagnostic in &self.diagnostics {
            write!(f, "\n  {}", diagnostic)?;
        }
        Ok(())
    }
}

impl std::error::Error for ReplicationError {}

/// Result type for replication operations
pub type ReplicationResult<T> = Result<T, ReplicationError>;

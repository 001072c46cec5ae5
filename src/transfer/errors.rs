//! Transfer error types
//!
//! Codes follow the DBCLONE_CATEGORY_NAME format. Every transfer error is
//! fatal for the run: a partially loaded destination has to be re-cloned.

use std::fmt;
use std::io;
use std::process::ExitStatus;

/// Transfer error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferErrorCode {
    /// A tool process could not be started
    DbcloneTransferSpawn,
    /// The dump to load pipe could not be set up
    DbcloneTransferPipe,
    /// The dump tool exited non-zero
    DbcloneTransferDumpFailed,
    /// The load tool exited non-zero
    DbcloneTransferLoadFailed,
    /// The stderr capture file could not be written or read
    DbcloneTransferCapture,
    /// Destination GTID state could not be reset
    DbcloneTransferGtidReset,
}

impl TransferErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferErrorCode::DbcloneTransferSpawn => "DBCLONE_TRANSFER_SPAWN",
            TransferErrorCode::DbcloneTransferPipe => "DBCLONE_TRANSFER_PIPE",
            TransferErrorCode::DbcloneTransferDumpFailed => "DBCLONE_TRANSFER_DUMP_FAILED",
            TransferErrorCode::DbcloneTransferLoadFailed => "DBCLONE_TRANSFER_LOAD_FAILED",
            TransferErrorCode::DbcloneTransferCapture => "DBCLONE_TRANSFER_CAPTURE",
            TransferErrorCode::DbcloneTransferGtidReset => "DBCLONE_TRANSFER_GTID_RESET",
        }
    }
}

impl fmt::Display for TransferErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transfer error with context
#[derive(Debug)]
pub struct TransferError {
    code: TransferErrorCode,
    message: String,
    source: Option<io::Error>,
}

impl TransferError {
    fn new(code: TransferErrorCode, message: impl Into<String>, source: Option<io::Error>) -> Self {
        Self {
            code,
            message: message.into(),
            source,
        }
    }

    /// A tool could not be started
    pub fn spawn(program: &str, source: io::Error) -> Self {
        Self::new(
            TransferErrorCode::DbcloneTransferSpawn,
            format!("failed to start {}", program),
            Some(source),
        )
    }

    pub fn pipe(message: impl Into<String>) -> Self {
        Self::new(TransferErrorCode::DbcloneTransferPipe, message, None)
    }

    /// The dump tool exited with `status`
    pub fn dump_failed(status: impl fmt::Display) -> Self {
        Self::new(
            TransferErrorCode::DbcloneTransferDumpFailed,
            format!("dump tool exited with {}", status),
            None,
        )
    }

    /// The load tool exited with `status`, with the dump's exit alongside
    /// when it was known
    pub fn load_failed(status: impl fmt::Display, dump: Option<ExitStatus>) -> Self {
        let message = match dump {
            Some(dump) if !dump.success() => {
                format!("load tool exited with {} (dump tool {})", status, dump)
            }
            _ => format!("load tool exited with {}", status),
        };
        Self::new(TransferErrorCode::DbcloneTransferLoadFailed, message, None)
    }

    pub fn capture(path: &std::path::Path, source: io::Error) -> Self {
        Self::new(
            TransferErrorCode::DbcloneTransferCapture,
            format!("capture file {}", path.display()),
            Some(source),
        )
    }

    pub fn wait(program: &str, source: io::Error) -> Self {
        Self::new(
            TransferErrorCode::DbcloneTransferPipe,
            format!("failed waiting for {}", program),
            Some(source),
        )
    }

    pub fn gtid_reset(message: impl Into<String>) -> Self {
        Self::new(TransferErrorCode::DbcloneTransferGtidReset, message, None)
    }

    pub fn code(&self) -> TransferErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if let Some(ref source) = self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for TransferError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for transfer operations
pub type TransferResult<T> = Result<T, TransferError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            TransferErrorCode::DbcloneTransferDumpFailed.as_str(),
            "DBCLONE_TRANSFER_DUMP_FAILED"
        );
        assert_eq!(
            TransferErrorCode::DbcloneTransferLoadFailed.as_str(),
            "DBCLONE_TRANSFER_LOAD_FAILED"
        );
    }

    #[test]
    fn test_display_includes_code_and_cause() {
        let err = TransferError::spawn(
            "mysqldump",
            io::Error::new(io::ErrorKind::NotFound, "no such file"),
        );
        let display = err.to_string();

        assert!(display.contains("DBCLONE_TRANSFER_SPAWN"));
        assert!(display.contains("mysqldump"));
        assert!(display.contains("no such file"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_exit_failures_have_no_source() {
        let err = TransferError::load_failed("exit status: 1", None);
        assert_eq!(err.code(), TransferErrorCode::DbcloneTransferLoadFailed);
        assert!(err.message().contains("exit status: 1"));
        assert!(err.source().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_load_failure_carries_failed_dump_status() {
        use std::os::unix::process::ExitStatusExt;

        let err = TransferError::load_failed("exit status: 1", Some(ExitStatus::from_raw(141 << 8)));
        assert!(err.message().contains("dump tool exit status: 141"));

        let err = TransferError::load_failed("exit status: 1", Some(ExitStatus::from_raw(0)));
        assert!(!err.message().contains("dump tool"));
    }
}

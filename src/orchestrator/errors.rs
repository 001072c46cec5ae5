//! # Clone Errors
//!
//! Every error that ends a run in FAILED.

use thiserror::Error;

use crate::replication::ReplicationError;
use crate::server::ServerError;
use crate::transfer::TransferError;

/// Result type for a clone run
pub type CloneResult<T> = Result<T, CloneError>;

/// Errors that fail a clone run
#[derive(Debug, Error)]
pub enum CloneError {
    /// Option combination is not allowed
    #[error("DBCLONE_OPTIONS_INVALID: {0}")]
    InvalidOptions(String),

    /// Session or statement failure on either server
    #[error(transparent)]
    Server(#[from] ServerError),

    /// Topology or requirement check refused replication, or wiring failed
    #[error(transparent)]
    Replication(#[from] ReplicationError),

    /// Dump or load failed
    #[error(transparent)]
    Transfer(#[from] TransferError),
}

impl CloneError {
    /// Stable code for the summary line
    pub fn code(&self) -> &'static str {
        match self {
            CloneError::InvalidOptions(_) => "DBCLONE_OPTIONS_INVALID",
            CloneError::Server(_) => "DBCLONE_SERVER_ERROR",
            CloneError::Replication(e) => e.kind.code(),
            CloneError::Transfer(e) => e.code().as_str(),
        }
    }

    /// Whether the destination may hold a partial load
    pub fn destination_touched(&self) -> bool {
        matches!(self, CloneError::Transfer(_))
    }
}

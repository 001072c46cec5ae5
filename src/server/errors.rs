//! # Server Errors
//!
//! Error types for server sessions and the external client adapter.

use thiserror::Error;

/// Result type for server operations
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors raised while talking to a database server
#[derive(Debug, Clone, Error)]
pub enum ServerError {
    /// Session could not be established
    #[error("Cannot connect to {server}: {message}")]
    ConnectionFailed { server: String, message: String },

    /// Operation attempted on a closed session
    #[error("Server {0} is not connected")]
    NotConnected(String),

    /// Statement rejected by the server or the client program
    #[error("Statement failed on {server}: {message}")]
    QueryFailed { server: String, message: String },

    /// Client program output could not be decoded
    #[error("Malformed result from {server}: {message}")]
    MalformedResult { server: String, message: String },

    /// Version string not in `major.minor.patch[-suffix]` form
    #[error("Unsupported server version string: {0}")]
    InvalidVersion(String),

    /// Client program could not be started
    #[error("Cannot run client program {program}: {message}")]
    ClientUnavailable { program: String, message: String },
}

impl ServerError {
    /// Returns true if the error means the session is gone
    pub fn is_connection_loss(&self) -> bool {
        matches!(
            self,
            ServerError::ConnectionFailed { .. } | ServerError::NotConnected(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_loss_classification() {
        assert!(ServerError::NotConnected("db1".into()).is_connection_loss());
        assert!(ServerError::ConnectionFailed {
            server: "db1".into(),
            message: "refused".into(),
        }
        .is_connection_loss());
        assert!(!ServerError::InvalidVersion("x".into()).is_connection_loss());
    }

    #[test]
    fn test_display_names_server() {
        let err = ServerError::QueryFailed {
            server: "db2".into(),
            message: "ERROR 1045".into(),
        };
        assert_eq!(err.to_string(), "Statement failed on db2: ERROR 1045");
    }
}

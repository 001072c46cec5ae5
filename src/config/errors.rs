//! # Config Errors

use std::path::PathBuf;

use thiserror::Error;

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Server configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("Failed to read config {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid JSON for a server entry
    #[error("Invalid config JSON in {}: {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Fields are present but unusable
    #[error("Invalid config {}: {}", .path.display(), .problems.join("; "))]
    Invalid { path: PathBuf, problems: Vec<String> },
}

impl ConfigError {
    /// Individual problems, one per line for the operator
    pub fn problems(&self) -> Vec<String> {
        match self {
            ConfigError::Invalid { problems, .. } => problems.clone(),
            other => vec![other.to_string()],
        }
    }
}

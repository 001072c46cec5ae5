//! Options for one clone run

use std::path::PathBuf;

use crate::replication::WaitPolicy;

use super::errors::{CloneError, CloneResult};

/// Parsed options the clone pipeline consumes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneOptions {
    /// Clone only; do not make the destination a replica
    pub no_replication: bool,
    /// Keep `GTID_PURGED` out of the dump. Only valid with `no_replication`.
    pub remove_gtid_purged: bool,
    /// Directory holding `mysqldump` / `mysql`
    pub program_dir: Option<PathBuf>,
    /// Directory for the dump stderr capture
    pub capture_dir: PathBuf,
    pub wait_policy: WaitPolicy,
}

impl Default for CloneOptions {
    fn default() -> Self {
        Self {
            no_replication: false,
            remove_gtid_purged: false,
            program_dir: None,
            capture_dir: std::env::temp_dir(),
            wait_policy: WaitPolicy::default(),
        }
    }
}

impl CloneOptions {
    pub fn want_replication(&self) -> bool {
        !self.no_replication
    }

    pub fn validate(&self) -> CloneResult<()> {
        if self.remove_gtid_purged && !self.no_replication {
            return Err(CloneError::InvalidOptions(
                "remove-gtid-purged requires no-replication".to_string(),
            ));
        }
        Ok(())
    }
}

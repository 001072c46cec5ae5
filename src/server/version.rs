//! Server version parsing and thresholds

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::ServerError;

/// Server version `(major, minor, patch)`, ordered lexicographically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ServerVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ServerVersion {
    /// Replication variables and dump flags switch from master/slave to
    /// source/replica naming here.
    pub const SOURCE_NAMING: ServerVersion = ServerVersion::new(8, 0, 26);

    /// `STOP/START/RESET REPLICA` and `SHOW REPLICA STATUS` exist from here.
    pub const REPLICA_STATEMENTS: ServerVersion = ServerVersion::new(8, 0, 22);

    /// `CHANGE REPLICATION SOURCE TO` exists from here.
    pub const CHANGE_SOURCE_STATEMENT: ServerVersion = ServerVersion::new(8, 0, 23);

    /// `RESET MASTER` and `SHOW MASTER STATUS` are gone from here.
    pub const BINARY_LOG_STATEMENTS: ServerVersion = ServerVersion::new(8, 4, 0);

    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Returns true if this version is at or past `threshold`
    pub fn at_least(&self, threshold: ServerVersion) -> bool {
        *self >= threshold
    }
}

impl Default for ServerVersion {
    fn default() -> Self {
        Self::new(0, 0, 0)
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl From<(u32, u32, u32)> for ServerVersion {
    fn from((major, minor, patch): (u32, u32, u32)) -> Self {
        Self::new(major, minor, patch)
    }
}

impl FromStr for ServerVersion {
    type Err = ServerError;

    /// Parses `@@version` values such as `8.0.28-log` or
    /// `5.7.44-0ubuntu0.18.04.1`. A missing patch component reads as 0.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let numeric = s
            .trim()
            .split(|c: char| c == '-' || c == '+' || c.is_whitespace())
            .next()
            .unwrap_or_default();

        let mut parts = numeric.split('.');
        let mut next_part = |required: bool| -> Result<u32, ServerError> {
            match parts.next() {
                Some(p) => p
                    .parse::<u32>()
                    .map_err(|_| ServerError::InvalidVersion(s.to_string())),
                None if required => Err(ServerError::InvalidVersion(s.to_string())),
                None => Ok(0),
            }
        };

        let major = next_part(true)?;
        let minor = next_part(true)?;
        let patch = next_part(false)?;

        Ok(Self::new(major, minor, patch))
    }
}

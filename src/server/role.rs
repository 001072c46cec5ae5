//! Role-typed views over a server session
//!
//! A `SourceRole` only exposes binary log coordinates and a `ReplicaRole`
//! only exposes replication link state. Each view holds the snapshot from
//! its last `refresh()`; nothing is readable before the first refresh.

use std::fmt;

use serde::Serialize;

use super::errors::ServerResult;
use super::handle::ServerHandle;
use super::status::{ReplicaStatus, SourceStatus};

/// Which side of the clone a server is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ServerRole {
    /// Server being cloned from
    Source,
    /// Server receiving the clone, optionally a replica of the source
    Destination,
}

impl ServerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerRole::Source => "source",
            ServerRole::Destination => "destination",
        }
    }
}

impl fmt::Display for ServerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time source coordinate with the server it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSnapshot {
    pub name: String,
    pub status: SourceStatus,
}

/// Point-in-time replica state with the server it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplicaSnapshot {
    pub name: String,
    pub gtid_mode: bool,
    pub status: ReplicaStatus,
}

/// A server acting as replication source
pub struct SourceRole<'a> {
    server: &'a mut dyn ServerHandle,
    status: Option<SourceStatus>,
}

impl<'a> SourceRole<'a> {
    pub fn new(server: &'a mut dyn ServerHandle) -> Self {
        Self {
            server,
            status: None,
        }
    }

    /// Read the current binary log coordinate.
    pub fn refresh(&mut self) -> ServerResult<&SourceStatus> {
        let status = self.server.source_status()?;
        Ok(self.status.insert(status))
    }

    /// Coordinate from the last refresh
    pub fn status(&self) -> Option<&SourceStatus> {
        self.status.as_ref()
    }

    pub fn snapshot(&self) -> Option<SourceSnapshot> {
        self.status.as_ref().map(|status| SourceSnapshot {
            name: self.server.name().to_string(),
            status: status.clone(),
        })
    }
}

/// A server acting as replica
pub struct ReplicaRole<'a> {
    server: &'a mut dyn ServerHandle,
    status: Option<ReplicaStatus>,
}

impl<'a> ReplicaRole<'a> {
    pub fn new(server: &'a mut dyn ServerHandle) -> Self {
        Self {
            server,
            status: None,
        }
    }

    /// Read the current link state. `None` means no link is configured.
    pub fn refresh(&mut self) -> ServerResult<Option<&ReplicaStatus>> {
        self.status = self.server.replica_status()?;
        Ok(self.status.as_ref())
    }

    /// Link state from the last refresh
    pub fn status(&self) -> Option<&ReplicaStatus> {
        self.status.as_ref()
    }

    pub fn snapshot(&self) -> Option<ReplicaSnapshot> {
        self.status.as_ref().map(|status| ReplicaSnapshot {
            name: self.server.name().to_string(),
            gtid_mode: self.server.gtid_mode(),
            status: status.clone(),
        })
    }

    /// Underlying session, for statements that change the link
    pub fn server(&mut self) -> &mut dyn ServerHandle {
        &mut *self.server
    }
}

//! The server session contract consumed by the clone pipeline

use std::collections::BTreeMap;

use super::errors::ServerResult;
use super::params::ConnectionParams;
use super::status::{ReplicaStatus, SourceStatus};
use super::version::ServerVersion;

/// A live session with one database server.
///
/// Implementations are created by a factory outside the clone pipeline.
/// `version()` and `gtid_mode()` are loaded by `connect()` and stay fixed
/// for the run. Status methods always read fresh state from the server.
pub trait ServerHandle {
    /// How this server is reached
    fn params(&self) -> &ConnectionParams;

    /// Version reported at connect time
    fn version(&self) -> ServerVersion;

    /// Whether the server identifies transactions by GTID
    fn gtid_mode(&self) -> bool;

    /// Open the session and load version and GTID mode.
    fn connect(&mut self) -> ServerResult<()>;

    /// Check the session is alive. A session that was never opened is not connected.
    fn is_connected(&mut self) -> bool;

    /// Close the session. Closing a closed session does nothing.
    fn disconnect(&mut self);

    /// Current global values for the named variables. Names the server does
    /// not know are absent from the result.
    fn global_variables(&mut self, names: &[&str]) -> ServerResult<BTreeMap<String, String>>;

    /// Execute a statement that returns no rows.
    fn execute(&mut self, statement: &str) -> ServerResult<()>;

    /// Binary log coordinate of this server acting as a source.
    fn source_status(&mut self) -> ServerResult<SourceStatus>;

    /// Replication link of this server acting as a replica, or `None` when
    /// no link is configured.
    fn replica_status(&mut self) -> ServerResult<Option<ReplicaStatus>>;

    /// Operator-facing name
    fn name(&self) -> &str {
        &self.params().name
    }

    /// Re-open a session that was lost. Does not count as a disconnect.
    fn reconnect(&mut self) -> ServerResult<()> {
        self.connect()
    }
}

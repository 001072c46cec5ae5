//! Replication status snapshots
//!
//! A snapshot is only meaningful at the instant it was read. Comparisons
//! between a source snapshot and a replica snapshot are advisory.

use std::collections::BTreeMap;

use serde::Serialize;

use super::errors::{ServerError, ServerResult};

/// One result row keyed by column name
pub type Row = BTreeMap<String, String>;

/// Binary log coordinate of a source, from `SHOW MASTER STATUS`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceStatus {
    pub log_file: String,
    pub log_position: u64,
    pub executed_gtid: Option<String>,
}

impl SourceStatus {
    /// Decode a `SHOW MASTER STATUS` / `SHOW BINARY LOG STATUS` row.
    pub fn from_row(server: &str, row: &Row) -> ServerResult<Self> {
        Ok(Self {
            log_file: required(server, row, &["File"])?.to_string(),
            log_position: position(server, row, &["Position"])?,
            executed_gtid: optional(row, &["Executed_Gtid_Set"]),
        })
    }
}

/// State of one replica thread as reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ThreadState {
    Running,
    Connecting,
    Stopped,
}

impl ThreadState {
    fn parse(value: &str) -> Self {
        match value.trim() {
            v if v.eq_ignore_ascii_case("yes") || v.eq_ignore_ascii_case("on") => {
                ThreadState::Running
            }
            v if v.eq_ignore_ascii_case("connecting") => ThreadState::Connecting,
            _ => ThreadState::Stopped,
        }
    }

    /// Thread is fully up
    pub fn is_up(&self) -> bool {
        matches!(self, ThreadState::Running)
    }

    /// Thread exists, possibly still connecting
    pub fn is_alive(&self) -> bool {
        !matches!(self, ThreadState::Stopped)
    }
}

/// Last error recorded by one replica thread
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadError {
    pub errno: u32,
    pub message: String,
    pub timestamp: String,
}

/// Replica-side view from `SHOW SLAVE STATUS` / `SHOW REPLICA STATUS`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplicaStatus {
    /// Source log file the IO thread is reading
    pub source_log_file: String,
    /// Source log file the SQL thread is executing
    pub relay_log_file: String,
    pub read_position: u64,
    pub exec_position: u64,
    pub retrieved_gtid: Option<String>,
    pub executed_gtid: Option<String>,
    pub io_state: String,
    pub io_thread: ThreadState,
    pub sql_thread: ThreadState,
    pub io_error: Option<ThreadError>,
    pub sql_error: Option<ThreadError>,
}

impl ReplicaStatus {
    /// Decode a replica status row. Both the legacy (`Master_*`, `Slave_*`)
    /// and current (`Source_*`, `Replica_*`) column names are accepted.
    ///
    /// GTID sets are kept only when `gtid_mode` is on.
    pub fn from_row(server: &str, row: &Row, gtid_mode: bool) -> ServerResult<Self> {
        let gtid = |names: &[&str]| if gtid_mode { optional(row, names) } else { None };

        Ok(Self {
            source_log_file: required(server, row, &["Master_Log_File", "Source_Log_File"])?
                .to_string(),
            relay_log_file: required(
                server,
                row,
                &["Relay_Master_Log_File", "Relay_Source_Log_File"],
            )?
            .to_string(),
            read_position: position(server, row, &["Read_Master_Log_Pos", "Read_Source_Log_Pos"])?,
            exec_position: position(server, row, &["Exec_Master_Log_Pos", "Exec_Source_Log_Pos"])?,
            retrieved_gtid: gtid(&["Retrieved_Gtid_Set"]),
            executed_gtid: gtid(&["Executed_Gtid_Set"]),
            io_state: optional(row, &["Slave_IO_State", "Replica_IO_State"]).unwrap_or_default(),
            io_thread: ThreadState::parse(
                required(server, row, &["Slave_IO_Running", "Replica_IO_Running"])?,
            ),
            sql_thread: ThreadState::parse(
                required(server, row, &["Slave_SQL_Running", "Replica_SQL_Running"])?,
            ),
            io_error: thread_error(row, "Last_IO_Errno", "Last_IO_Error", "Last_IO_Error_Timestamp"),
            sql_error: thread_error(
                row,
                "Last_SQL_Errno",
                "Last_SQL_Error",
                "Last_SQL_Error_Timestamp",
            ),
        })
    }

    /// Replication threads exist on the server
    pub fn threads_present(&self) -> bool {
        !self.io_state.is_empty()
    }

    pub fn io_thread_up(&self) -> bool {
        self.io_thread.is_up()
    }

    pub fn sql_thread_up(&self) -> bool {
        self.sql_thread.is_up()
    }

    /// At least one replication thread is alive
    pub fn running(&self) -> bool {
        self.io_thread.is_alive() || self.sql_thread.is_up()
    }
}

fn lookup<'a>(row: &'a Row, names: &[&str]) -> Option<&'a str> {
    names
        .iter()
        .find_map(|name| row.get(*name))
        .map(|v| v.as_str())
}

fn required<'a>(server: &str, row: &'a Row, names: &[&str]) -> ServerResult<&'a str> {
    lookup(row, names).ok_or_else(|| ServerError::MalformedResult {
        server: server.to_string(),
        message: format!("missing column {}", names.join("/")),
    })
}

fn optional(row: &Row, names: &[&str]) -> Option<String> {
    lookup(row, names)
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != "NULL")
        .map(str::to_string)
}

fn position(server: &str, row: &Row, names: &[&str]) -> ServerResult<u64> {
    let raw = required(server, row, names)?;
    raw.trim().parse().map_err(|_| ServerError::MalformedResult {
        server: server.to_string(),
        message: format!("{} is not a log position: {}", names[0], raw),
    })
}

fn thread_error(row: &Row, errno: &str, message: &str, timestamp: &str) -> Option<ThreadError> {
    let errno: u32 = lookup(row, &[errno])?.trim().parse().ok()?;
    if errno == 0 {
        return None;
    }

    Some(ThreadError {
        errno,
        message: optional(row, &[message]).unwrap_or_default(),
        timestamp: optional(row, &[timestamp]).unwrap_or_default(),
    })
}

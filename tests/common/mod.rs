//! In-memory server and transfer doubles shared by the integration tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use dbclone::server::{
    ConnectionParams, ReplicaStatus, ReplicationCredentials, ServerError, ServerHandle,
    ServerResult, ServerVersion, SourceStatus, ThreadState,
};
use dbclone::transfer::{DataTransfer, TransferError, TransferOutcome, TransferPlan, TransferResult};

/// Ordered record of statements and transfers across several doubles
pub type Journal = Rc<RefCell<Vec<String>>>;

pub const SOURCE_FILE: &str = "mysql-bin.000042";
pub const SOURCE_POSITION: u64 = 9120;

/// A server held entirely in memory
pub struct FakeServer {
    pub params: ConnectionParams,
    pub version: ServerVersion,
    pub gtid_mode: bool,
    pub variables: BTreeMap<String, String>,
    pub source: SourceStatus,
    /// Current link, `None` when no link is configured
    pub replica: Option<ReplicaStatus>,
    /// Link state installed by `START SLAVE` / `START REPLICA`
    pub replica_after_start: Option<ReplicaStatus>,
    pub fail_connect: bool,
    /// First liveness check after connecting reports a dropped session
    pub drop_session_on_check: bool,
    pub connected: bool,
    pub connects: usize,
    pub disconnects: usize,
    pub executed: Vec<String>,
    /// Shared record, entries are `<name>: <statement>`
    pub journal: Option<Journal>,
}

impl FakeServer {
    fn new(name: &str, host: &str, version: ServerVersion, gtid_mode: bool) -> Self {
        Self {
            params: ConnectionParams::new(name, host, "admin"),
            version,
            gtid_mode,
            variables: BTreeMap::new(),
            source: SourceStatus {
                log_file: SOURCE_FILE.to_string(),
                log_position: SOURCE_POSITION,
                executed_gtid: None,
            },
            replica: None,
            replica_after_start: None,
            fail_connect: false,
            drop_session_on_check: false,
            connected: false,
            connects: 0,
            disconnects: 0,
            executed: Vec::new(),
            journal: None,
        }
    }

    /// Source meeting every requirement, with a replication account
    pub fn source(version: ServerVersion, gtid_mode: bool) -> Self {
        let mut server = Self::new("db1", "10.0.0.1", version, gtid_mode);
        server.params.replication = Some(ReplicationCredentials {
            user: "repl".into(),
            password: "replpass".into(),
        });
        server.set_all(&[
            ("log_bin", "ON"),
            ("sync_binlog", "1"),
            ("innodb_flush_log_at_trx_commit", "1"),
            ("innodb_support_xa", "ON"),
            ("binlog_format", "ROW"),
        ]);
        server
    }

    /// Destination meeting every requirement, whose link comes up healthy
    pub fn destination(version: ServerVersion, gtid_mode: bool) -> Self {
        let mut server = Self::new("db2", "10.0.0.2", version, gtid_mode);
        server.set_all(&[
            ("log_bin", "ON"),
            ("read_only", "ON"),
            ("log_slave_updates", "ON"),
            ("log_replica_updates", "ON"),
            ("sync_master_info", "1"),
            ("sync_source_info", "1"),
            ("sync_relay_log", "1"),
            ("sync_relay_log_info", "1"),
        ]);
        server.replica_after_start = Some(healthy_link());
        server
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.variables.insert(name.to_string(), value.to_string());
    }

    pub fn set_all(&mut self, pairs: &[(&str, &str)]) {
        for (name, value) in pairs {
            self.set(name, value);
        }
    }

    pub fn executed_any(&self, prefix: &str) -> bool {
        self.executed.iter().any(|s| s.starts_with(prefix))
    }
}

/// Link caught up with the fake source coordinate
pub fn healthy_link() -> ReplicaStatus {
    ReplicaStatus {
        source_log_file: SOURCE_FILE.to_string(),
        relay_log_file: SOURCE_FILE.to_string(),
        read_position: SOURCE_POSITION,
        exec_position: SOURCE_POSITION,
        retrieved_gtid: None,
        executed_gtid: None,
        io_state: "Waiting for source to send event".to_string(),
        io_thread: ThreadState::Running,
        sql_thread: ThreadState::Running,
        io_error: None,
        sql_error: None,
    }
}

impl ServerHandle for FakeServer {
    fn params(&self) -> &ConnectionParams {
        &self.params
    }

    fn version(&self) -> ServerVersion {
        self.version
    }

    fn gtid_mode(&self) -> bool {
        self.gtid_mode
    }

    fn connect(&mut self) -> ServerResult<()> {
        self.connects += 1;
        if self.fail_connect {
            return Err(ServerError::ConnectionFailed {
                server: self.params.name.clone(),
                message: "Can't connect to MySQL server".into(),
            });
        }
        self.connected = true;
        Ok(())
    }

    fn is_connected(&mut self) -> bool {
        if self.drop_session_on_check {
            self.drop_session_on_check = false;
            self.connected = false;
        }
        self.connected
    }

    fn disconnect(&mut self) {
        self.disconnects += 1;
        self.connected = false;
    }

    fn global_variables(&mut self, names: &[&str]) -> ServerResult<BTreeMap<String, String>> {
        Ok(self
            .variables
            .iter()
            .filter(|(name, _)| names.contains(&name.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect())
    }

    fn execute(&mut self, statement: &str) -> ServerResult<()> {
        if !self.connected {
            return Err(ServerError::NotConnected(self.params.name.clone()));
        }
        self.executed.push(statement.to_string());
        if let Some(journal) = &self.journal {
            journal
                .borrow_mut()
                .push(format!("{}: {}", self.params.name, statement));
        }

        if statement.starts_with("START SLAVE") || statement.starts_with("START REPLICA") {
            self.replica = self.replica_after_start.clone();
        } else if statement.starts_with("STOP SLAVE") || statement.starts_with("STOP REPLICA") {
            if let Some(link) = self.replica.as_mut() {
                link.io_thread = ThreadState::Stopped;
                link.sql_thread = ThreadState::Stopped;
                link.io_state.clear();
            }
        } else if statement.starts_with("RESET SLAVE ALL") || statement.starts_with("RESET REPLICA ALL") {
            self.replica = None;
        }
        Ok(())
    }

    fn source_status(&mut self) -> ServerResult<SourceStatus> {
        Ok(self.source.clone())
    }

    fn replica_status(&mut self) -> ServerResult<Option<ReplicaStatus>> {
        Ok(self.replica.clone())
    }
}

/// Records every plan instead of running any tool
#[derive(Default)]
pub struct RecordingTransfer {
    pub plans: Vec<TransferPlan>,
    pub fail_with_exit: Option<i32>,
    pub stderr_output: bool,
    /// Receives a `TRANSFER` entry per run
    pub journal: Option<Journal>,
}

impl DataTransfer for RecordingTransfer {
    fn run(&mut self, plan: &TransferPlan) -> TransferResult<TransferOutcome> {
        self.plans.push(plan.clone());
        if let Some(journal) = &self.journal {
            journal.borrow_mut().push("TRANSFER".to_string());
        }
        if let Some(code) = self.fail_with_exit {
            return Err(TransferError::load_failed(format!("exit status: {}", code), None));
        }
        Ok(TransferOutcome {
            capture_path: plan.capture.path().to_path_buf(),
            had_error_output: self.stderr_output,
        })
    }
}

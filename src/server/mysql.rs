//! `ServerHandle` backed by the `mysql` command-line client
//!
//! Each statement is a separate client invocation, so "connected" means the
//! last liveness check succeeded. A failed check marks the session closed until the
//! next `connect()`.

use std::collections::BTreeMap;

use super::errors::{ServerError, ServerResult};
use super::handle::ServerHandle;
use super::params::ConnectionParams;
use super::query::{MysqlClient, QueryRunner, ResultSet};
use super::statements;
use super::status::{ReplicaStatus, SourceStatus};
use super::version::ServerVersion;

const SERVER_FACTS: &str = "SELECT @@GLOBAL.version AS version, @@GLOBAL.gtid_mode AS gtid_mode";

/// A MySQL server reached through a `QueryRunner`
pub struct MysqlServer<R: QueryRunner = MysqlClient> {
    params: ConnectionParams,
    runner: R,
    connected: bool,
    version: ServerVersion,
    gtid_mode: bool,
}

impl<R: QueryRunner> MysqlServer<R> {
    /// Create an unconnected handle.
    pub fn new(params: ConnectionParams, runner: R) -> Self {
        Self {
            params,
            runner,
            connected: false,
            version: ServerVersion::default(),
            gtid_mode: false,
        }
    }

    fn require_connected(&self) -> ServerResult<()> {
        if self.connected {
            Ok(())
        } else {
            Err(ServerError::NotConnected(self.params.name.clone()))
        }
    }

    fn run(&self, sql: &str) -> ServerResult<ResultSet> {
        self.require_connected()?;
        self.runner.query(&self.params, sql)
    }
}

impl<R: QueryRunner> ServerHandle for MysqlServer<R> {
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
        let facts = self
            .runner
            .query(&self.params, SERVER_FACTS)
            .map_err(|e| ServerError::ConnectionFailed {
                server: self.params.name.clone(),
                message: e.to_string(),
            })?;

        let row = facts.first_row().ok_or_else(|| ServerError::MalformedResult {
            server: self.params.name.clone(),
            message: "server facts query returned no rows".to_string(),
        })?;

        let version = row.get("version").map(String::as_str).unwrap_or_default();
        self.version = version.parse()?;
        self.gtid_mode = row
            .get("gtid_mode")
            .map(|mode| mode.eq_ignore_ascii_case("ON"))
            .unwrap_or(false);
        self.connected = true;

        Ok(())
    }

    fn is_connected(&mut self) -> bool {
        if !self.connected {
            return false;
        }

        if self.runner.query(&self.params, "SELECT 1").is_err() {
            self.connected = false;
        }
        self.connected
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn global_variables(&mut self, names: &[&str]) -> ServerResult<BTreeMap<String, String>> {
        let rs = self.run(&statements::show_global_variables(names))?;
        let mut pairs = rs.pairs();
        pairs.retain(|name, _| names.contains(&name.as_str()));
        Ok(pairs)
    }

    fn execute(&mut self, statement: &str) -> ServerResult<()> {
        self.run(statement).map(|_| ())
    }

    fn source_status(&mut self) -> ServerResult<SourceStatus> {
        let rs = self.run(statements::show_source_status(self.version))?;
        let row = rs.first_row().ok_or_else(|| ServerError::MalformedResult {
            server: self.params.name.clone(),
            message: "no binary log status, is log_bin enabled?".to_string(),
        })?;
        SourceStatus::from_row(&self.params.name, &row)
    }

    fn replica_status(&mut self) -> ServerResult<Option<ReplicaStatus>> {
        let rs = self.run(statements::show_replica_status(self.version))?;
        rs.first_row()
            .map(|row| ReplicaStatus::from_row(&self.params.name, &row, self.gtid_mode))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replays canned batch outputs and records every statement
    struct ScriptedRunner {
        replies: RefCell<VecDeque<ServerResult<String>>>,
        seen: RefCell<Vec<String>>,
    }

    impl ScriptedRunner {
        fn new(replies: Vec<ServerResult<&str>>) -> Self {
            Self {
                replies: RefCell::new(
                    replies.into_iter().map(|r| r.map(str::to_string)).collect(),
                ),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl QueryRunner for ScriptedRunner {
        fn query(&self, _params: &ConnectionParams, sql: &str) -> ServerResult<ResultSet> {
            self.seen.borrow_mut().push(sql.to_string());
            let reply = self
                .replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(String::new()));
            reply.map(|out| ResultSet::from_batch_output(&out))
        }
    }

    fn server(replies: Vec<ServerResult<&str>>) -> MysqlServer<ScriptedRunner> {
        MysqlServer::new(
            ConnectionParams::new("db1", "10.0.0.5", "root"),
            ScriptedRunner::new(replies),
        )
    }

    fn query_failed() -> ServerError {
        ServerError::QueryFailed {
            server: "db1".into(),
            message: "ERROR 2013 (HY000): Lost connection".into(),
        }
    }

    #[test]
    fn test_connect_loads_version_and_gtid_mode() {
        let mut srv = server(vec![Ok("version\tgtid_mode\n8.0.28-log\tON\n")]);
        srv.connect().unwrap();

        assert_eq!(srv.version(), ServerVersion::new(8, 0, 28));
        assert!(srv.gtid_mode());
        assert_eq!(srv.name(), "db1");
    }

    #[test]
    fn test_connect_failure_reports_connection_error() {
        let mut srv = server(vec![Err(query_failed())]);
        let err = srv.connect().unwrap_err();

        assert!(err.is_connection_loss());
        assert!(!srv.is_connected());
    }

    #[test]
    fn test_statements_require_connection() {
        let mut srv = server(vec![]);
        assert!(matches!(
            srv.execute("STOP SLAVE"),
            Err(ServerError::NotConnected(_))
        ));
    }

    #[test]
    fn test_failed_liveness_check_marks_disconnected() {
        let mut srv = server(vec![
            Ok("version\tgtid_mode\n5.7.44\tOFF\n"),
            Err(query_failed()),
        ]);
        srv.connect().unwrap();

        assert!(!srv.is_connected());
        assert!(!srv.is_connected());
    }

    #[test]
    fn test_global_variables_filters_to_requested_names() {
        let mut srv = server(vec![
            Ok("version\tgtid_mode\n5.7.44\tOFF\n"),
            Ok("Variable_name\tValue\nlog_bin\tON\nlog_bin_basename\t/var/lib/mysql/bin\n"),
        ]);
        srv.connect().unwrap();

        let vars = srv.global_variables(&["log_bin", "sync_binlog"]).unwrap();
        assert_eq!(vars.len(), 1);
        assert_eq!(vars["log_bin"], "ON");
    }

    #[test]
    fn test_replica_status_uses_version_spelling() {
        let mut srv = server(vec![Ok("version\tgtid_mode\n8.0.28\tON\n"), Ok("")]);
        srv.connect().unwrap();

        assert!(srv.replica_status().unwrap().is_none());
        assert_eq!(srv.runner.seen.borrow()[1], "SHOW REPLICA STATUS");
    }

    #[test]
    fn test_source_status_without_binlog_is_error() {
        let mut srv = server(vec![Ok("version\tgtid_mode\n5.7.44\tOFF\n"), Ok("")]);
        srv.connect().unwrap();

        assert!(matches!(
            srv.source_status(),
            Err(ServerError::MalformedResult { .. })
        ));
        assert_eq!(srv.runner.seen.borrow()[1], "SHOW MASTER STATUS");
    }
}

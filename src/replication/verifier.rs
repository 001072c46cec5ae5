//! Post-start replication health
//!
//! `verify` is pure: it takes one snapshot per server and reports what it
//! sees. Every finding is advisory and never changes the outcome of a run.
//!
//! Per replica, checks run in this order:
//! 1. Thread health, first failure only (threads down > IO down > SQL down)
//! 2. Thread errors, IO and SQL reported independently
//! 3. Read position against the source coordinate (needs a source)
//! 4. Read position against exec position (local replay lag)

use serde::Serialize;

use crate::observability::{log_event_with_fields, Event, Logger, Severity};
use crate::server::{ReplicaSnapshot, SourceSnapshot, ThreadError};

/// One observation about replication health
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "finding", rename_all = "snake_case")]
pub enum Finding {
    /// No source snapshot; source-relative checks skipped
    NoSource,

    /// No replica snapshots; nothing checked
    NoReplicas,

    /// Replication threads absent or not running
    ThreadsDown { replica: String },

    /// IO thread not running
    IoThreadDown { replica: String },

    /// SQL thread not running
    SqlThreadDown { replica: String },

    /// IO thread recorded an error
    IoError { replica: String, error: ThreadError },

    /// SQL thread recorded an error
    SqlError { replica: String, error: ThreadError },

    /// Replica has not read up to the source's current coordinate
    ReadLag {
        replica: String,
        source_file: String,
        source_position: u64,
        read_file: String,
        read_position: u64,
    },

    /// Replica has read more than it has executed
    ExecLag {
        replica: String,
        read_file: String,
        read_position: u64,
        exec_file: String,
        exec_position: u64,
        retrieved_gtid: Option<String>,
        executed_gtid: Option<String>,
    },
}

impl Finding {
    /// Log event name for this finding
    pub fn event_name(&self) -> &'static str {
        match self {
            Finding::NoSource => "VERIFY_NO_SOURCE",
            Finding::NoReplicas => "VERIFY_NO_REPLICAS",
            Finding::ThreadsDown { .. } => "REPLICA_THREADS_DOWN",
            Finding::IoThreadDown { .. } => "REPLICA_IO_THREAD_DOWN",
            Finding::SqlThreadDown { .. } => "REPLICA_SQL_THREAD_DOWN",
            Finding::IoError { .. } => "REPLICA_IO_ERROR",
            Finding::SqlError { .. } => "REPLICA_SQL_ERROR",
            Finding::ReadLag { .. } => "REPLICA_READ_LAG",
            Finding::ExecLag { .. } => "REPLICA_EXEC_LAG",
        }
    }

    /// Missing counterparts are informational; everything else is a warning.
    pub fn severity(&self) -> Severity {
        match self {
            Finding::NoSource | Finding::NoReplicas => Severity::Info,
            _ => Severity::Warn,
        }
    }

    /// Replica this finding is about, if any
    pub fn replica(&self) -> Option<&str> {
        match self {
            Finding::NoSource | Finding::NoReplicas => None,
            Finding::ThreadsDown { replica }
            | Finding::IoThreadDown { replica }
            | Finding::SqlThreadDown { replica }
            | Finding::IoError { replica, .. }
            | Finding::SqlError { replica, .. }
            | Finding::ReadLag { replica, .. }
            | Finding::ExecLag { replica, .. } => Some(replica),
        }
    }

    /// Whether this finding is a lag warning
    pub fn is_lag(&self) -> bool {
        matches!(self, Finding::ReadLag { .. } | Finding::ExecLag { .. })
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(replica) = self.replica() {
            fields.push(("replica", replica.to_string()));
        }

        match self {
            Finding::IoError { error, .. } | Finding::SqlError { error, .. } => {
                fields.push(("errno", error.errno.to_string()));
                fields.push(("message", error.message.clone()));
                fields.push(("timestamp", error.timestamp.clone()));
            }
            Finding::ReadLag {
                source_file,
                source_position,
                read_file,
                read_position,
                ..
            } => {
                fields.push(("source_file", source_file.clone()));
                fields.push(("source_position", source_position.to_string()));
                fields.push(("read_file", read_file.clone()));
                fields.push(("read_position", read_position.to_string()));
            }
            Finding::ExecLag {
                read_file,
                read_position,
                exec_file,
                exec_position,
                retrieved_gtid,
                executed_gtid,
                ..
            } => {
                fields.push(("read_file", read_file.clone()));
                fields.push(("read_position", read_position.to_string()));
                fields.push(("exec_file", exec_file.clone()));
                fields.push(("exec_position", exec_position.to_string()));
                if let Some(gtid) = retrieved_gtid {
                    fields.push(("retrieved_gtid", gtid.clone()));
                }
                if let Some(gtid) = executed_gtid {
                    fields.push(("executed_gtid", gtid.clone()));
                }
            }
            _ => {}
        }

        fields
    }
}

/// Everything one verification pass saw
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    pub findings: Vec<Finding>,
    /// Replicas that were examined
    pub replicas: Vec<String>,
}

impl VerificationReport {
    /// No warnings; informational findings do not count
    pub fn is_healthy(&self) -> bool {
        self.findings
            .iter()
            .all(|f| matches!(f, Finding::NoSource | Finding::NoReplicas))
    }

    pub fn findings_for<'a>(&'a self, replica: &'a str) -> impl Iterator<Item = &'a Finding> {
        self.findings
            .iter()
            .filter(move |f| f.replica() == Some(replica))
    }

    pub fn has_lag(&self) -> bool {
        self.findings.iter().any(Finding::is_lag)
    }
}

/// Check each replica against the source, once.
pub fn verify(source: Option<&SourceSnapshot>, replicas: &[ReplicaSnapshot]) -> VerificationReport {
    let mut report = VerificationReport::default();

    if replicas.is_empty() {
        report.findings.push(Finding::NoReplicas);
        return report;
    }
    if source.is_none() {
        report.findings.push(Finding::NoSource);
    }

    for replica in replicas {
        report.replicas.push(replica.name.clone());
        check_threads(replica, &mut report.findings);
        check_errors(replica, &mut report.findings);
        if let Some(source) = source {
            check_read_lag(source, replica, &mut report.findings);
        }
        check_exec_lag(replica, &mut report.findings);
    }

    report
}

fn check_threads(replica: &ReplicaSnapshot, findings: &mut Vec<Finding>) {
    let status = &replica.status;
    let name = replica.name.clone();

    if !status.threads_present() || !status.running() {
        findings.push(Finding::ThreadsDown { replica: name });
    } else if !status.io_thread_up() {
        findings.push(Finding::IoThreadDown { replica: name });
    } else if !status.sql_thread_up() {
        findings.push(Finding::SqlThreadDown { replica: name });
    }
}

fn check_errors(replica: &ReplicaSnapshot, findings: &mut Vec<Finding>) {
    if let Some(error) = &replica.status.io_error {
        findings.push(Finding::IoError {
            replica: replica.name.clone(),
            error: error.clone(),
        });
    }
    if let Some(error) = &replica.status.sql_error {
        findings.push(Finding::SqlError {
            replica: replica.name.clone(),
            error: error.clone(),
        });
    }
}

fn check_read_lag(source: &SourceSnapshot, replica: &ReplicaSnapshot, findings: &mut Vec<Finding>) {
    let status = &replica.status;
    if source.status.log_file == status.source_log_file
        && source.status.log_position == status.read_position
    {
        return;
    }

    findings.push(Finding::ReadLag {
        replica: replica.name.clone(),
        source_file: source.status.log_file.clone(),
        source_position: source.status.log_position,
        read_file: status.source_log_file.clone(),
        read_position: status.read_position,
    });
}

fn check_exec_lag(replica: &ReplicaSnapshot, findings: &mut Vec<Finding>) {
    let status = &replica.status;
    if status.source_log_file == status.relay_log_file
        && status.read_position == status.exec_position
    {
        return;
    }

    let (retrieved_gtid, executed_gtid) = if replica.gtid_mode {
        (status.retrieved_gtid.clone(), status.executed_gtid.clone())
    } else {
        (None, None)
    };

    findings.push(Finding::ExecLag {
        replica: replica.name.clone(),
        read_file: status.source_log_file.clone(),
        read_position: status.read_position,
        exec_file: status.relay_log_file.clone(),
        exec_position: status.exec_position,
        retrieved_gtid,
        executed_gtid,
    });
}

/// Emit one log line per finding, and a healthy line per clean replica.
pub fn log_report(report: &VerificationReport) {
    for finding in &report.findings {
        let owned = finding.fields();
        let fields: Vec<(&str, &str)> = owned.iter().map(|(k, v)| (*k, v.as_str())).collect();
        Logger::log(finding.severity(), finding.event_name(), &fields);
    }

    for replica in &report.replicas {
        if report.findings_for(replica).next().is_none() {
            log_event_with_fields(Event::ReplicaHealthy, &[("replica", replica.as_str())]);
        }
    }
}

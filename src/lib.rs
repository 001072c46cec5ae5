//! dbclone - clone a MySQL server and optionally make the clone a replica
//!
//! The clone is a `mysqldump | mysql` pipe between two servers. Around it:
//! - Requirement checks on both servers before anything irreversible
//! - Dump coordinate flags chosen from version and GTID mode
//! - Replication wiring and an advisory health report afterwards

pub mod cli;
pub mod config;
pub mod observability;
pub mod orchestrator;
pub mod replication;
pub mod server;
pub mod transfer;

//! Server sessions
//!
//! The clone pipeline only sees the `ServerHandle` contract. `MysqlServer`
//! is the production implementation; tests substitute in-memory handles.
//!
//! Role-specific state is reached through `SourceRole` / `ReplicaRole`,
//! which hold the snapshot of their last refresh.

mod errors;
mod handle;
mod mysql;
mod params;
mod query;
mod role;
pub mod statements;
mod status;
mod version;

pub use errors::{ServerError, ServerResult};
pub use handle::ServerHandle;
pub use mysql::MysqlServer;
pub use params::{ConnectionParams, ReplicationCredentials};
pub use query::{MysqlClient, QueryRunner, ResultSet};
pub use role::{ReplicaRole, ReplicaSnapshot, ServerRole, SourceRole, SourceSnapshot};
pub use status::{ReplicaStatus, Row, SourceStatus, ThreadError, ThreadState};
pub use version::ServerVersion;

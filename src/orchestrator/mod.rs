//! Clone orchestration
//!
//! Sequences the connection, topology and requirement gates, the transfer
//! and the optional replication wiring. All hard checks run before the
//! transfer, which cannot be undone.

mod errors;
mod options;
mod program;
mod report;

pub use errors::{CloneError, CloneResult};
pub use options::CloneOptions;
pub use program::run_program;
pub use report::{CloneMode, CloneReport};

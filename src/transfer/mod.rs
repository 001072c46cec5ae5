//! Dump/load transfer
//!
//! The single irreversible step of a clone. Builds the dump and load
//! invocations, resets destination GTID state when needed, and runs the two
//! tools connected by a pipe with the dump's stderr captured to a file.
//!
//! ```text
//! mysqldump <conn> <static> <coordinate> [--set-gtid-purged=OFF] 2> capture
//!     | mysql <conn>
//! ```

mod capture;
mod command;
mod errors;
mod pipeline;

pub use capture::CapturePath;
pub use command::{DumpCommand, LoadCommand, ToolSet, STATIC_DUMP_ARGS, SUPPRESS_GTID_PURGED_ARG};
pub use errors::{TransferError, TransferErrorCode, TransferResult};
pub use pipeline::{transfer, DataTransfer, PipeTransfer, TransferOutcome, TransferPlan};

//! CLI module for dbclone
//!
//! One command: clone `--source` into `--destination`, then print a JSON
//! summary on stdout.

mod args;
mod commands;
mod errors;
mod io;

pub use args::Cli;
pub use commands::{run, run_clone};
pub use errors::{CliError, CliErrorCode, CliResult};

//! dbclone CLI entry point
//!
//! Parsing, configuration and the clone run all live in `cli::run`. This
//! only maps a failure to a non-zero exit status.

use dbclone::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

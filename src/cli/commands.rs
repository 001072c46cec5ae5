//! CLI command implementation
//!
//! Loads both server entries, builds `mysql`-client backed handles and runs
//! the clone with the pipe transfer. `main` only sees the final error.

use std::path::Path;

use crate::config::{ConfigError, ServerConfig};
use crate::orchestrator::{run_program, CloneError, CloneReport};
use crate::server::{MysqlClient, MysqlServer};
use crate::transfer::{PipeTransfer, ToolSet};

use super::args::Cli;
use super::errors::{CliError, CliErrorCode, CliResult};
use super::io::{write_error, write_response};

/// Parse arguments and run one clone
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_clone(&cli).map(|_| ())
}

/// Run a clone as described by `cli`, writing the JSON summary.
pub fn run_clone(cli: &Cli) -> CliResult<CloneReport> {
    let (source, destination) = match load_pair(&cli.config_dir, &cli.source, &cli.destination) {
        Ok(pair) => pair,
        Err((message, problems)) => {
            write_error(CliErrorCode::ConfigError.code(), &message, &problems)?;
            return Err(CliError::config_error(message));
        }
    };

    let options = cli.to_options();
    let tools = ToolSet::resolve(options.program_dir.as_deref());

    let mut source = MysqlServer::new(source.to_params(), MysqlClient::new(tools.load.clone()));
    let mut destination = MysqlServer::new(destination.to_params(), MysqlClient::new(tools.load.clone()));
    let mut transfer = PipeTransfer::new();

    match run_program(&options, &mut source, &mut destination, &mut transfer) {
        Ok(report) => {
            write_response(serde_json::to_value(&report)?)?;
            Ok(report)
        }
        Err(e) => {
            write_error(e.code(), &e.to_string(), &failure_details(&e))?;
            Err(e.into())
        }
    }
}

/// Load both entries, reporting the problems of both before failing.
fn load_pair(
    dir: &Path,
    source: &str,
    destination: &str,
) -> Result<(ServerConfig, ServerConfig), (String, Vec<String>)> {
    match (
        ServerConfig::load_named(dir, source),
        ServerConfig::load_named(dir, destination),
    ) {
        (Ok(s), Ok(d)) => Ok((s, d)),
        (s, d) => {
            let errors: Vec<ConfigError> = [s.err(), d.err()].into_iter().flatten().collect();
            let message = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            let problems = errors.iter().flat_map(ConfigError::problems).collect();
            Err((message, problems))
        }
    }
}

fn failure_details(err: &CloneError) -> Vec<String> {
    match err {
        CloneError::Replication(e) => e.diagnostics.iter().map(ToString::to_string).collect(),
        _ => Vec::new(),
    }
}

//! Dump and load command construction
//!
//! Argument order for the dump tool:
//! connection args, static args, coordinate tail, GTID purge suppression.
//! Connection args come first because `--defaults-extra-file` is only
//! honored as the first option.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::server::ConnectionParams;

/// Arguments every dump carries
pub const STATIC_DUMP_ARGS: &[&str] = &[
    "--single-transaction",
    "--all-databases",
    "--triggers",
    "--routines",
    "--events",
    "--ignore-table=mysql.event",
];

/// Keeps `SET @@GLOBAL.GTID_PURGED` out of the dump
pub const SUPPRESS_GTID_PURGED_ARG: &str = "--set-gtid-purged=OFF";

const DUMP_PROGRAM: &str = "mysqldump";
const LOAD_PROGRAM: &str = "mysql";

/// Locations of the dump and load tools
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSet {
    pub dump: PathBuf,
    pub load: PathBuf,
}

impl ToolSet {
    /// Resolve tool names under `program_dir`, or leave them to `PATH`.
    pub fn resolve(program_dir: Option<&Path>) -> Self {
        match program_dir {
            Some(dir) => Self {
                dump: dir.join(DUMP_PROGRAM),
                load: dir.join(LOAD_PROGRAM),
            },
            None => Self {
                dump: PathBuf::from(DUMP_PROGRAM),
                load: PathBuf::from(LOAD_PROGRAM),
            },
        }
    }
}

impl Default for ToolSet {
    fn default() -> Self {
        Self::resolve(None)
    }
}

/// Fully built dump invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl DumpCommand {
    pub fn build(
        tools: &ToolSet,
        source: &ConnectionParams,
        dump_tail: &[String],
        suppress_gtid_purged: bool,
    ) -> Self {
        let mut args = source.client_args();
        args.extend(STATIC_DUMP_ARGS.iter().map(|a| a.to_string()));
        args.extend(dump_tail.iter().cloned());
        if suppress_gtid_purged {
            args.push(SUPPRESS_GTID_PURGED_ARG.to_string());
        }

        Self {
            program: tools.dump.clone(),
            args,
        }
    }

    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }

    /// Arguments with any inline password masked, for logs and reports
    pub fn redacted_args(&self) -> Vec<String> {
        redact(&self.args)
    }

    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }
}

/// Fully built load invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl LoadCommand {
    pub fn build(tools: &ToolSet, destination: &ConnectionParams) -> Self {
        Self {
            program: tools.load.clone(),
            args: destination.client_args(),
        }
    }

    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }

    pub fn redacted_args(&self) -> Vec<String> {
        redact(&self.args)
    }
}

fn redact(args: &[String]) -> Vec<String> {
    args.iter()
        .map(|arg| {
            if arg.starts_with("--password=") {
                "--password=***".to_string()
            } else {
                arg.clone()
            }
        })
        .collect()
}

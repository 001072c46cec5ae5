//! CLI argument definitions using clap
//!
//! ```text
//! dbclone -c <SOURCE> -t <DESTINATION> -d <CONFIG_DIR> [-n [-r]] [-p <DIR>]
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::orchestrator::CloneOptions;
use crate::replication::WaitPolicy;

/// dbclone - clone a MySQL server and optionally make the clone a replica
#[derive(Parser, Debug)]
#[command(name = "dbclone")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Source server name (reads <CONFIG_DIR>/<NAME>.json)
    #[arg(short = 'c', long, value_name = "NAME")]
    pub source: String,

    /// Destination server name (reads <CONFIG_DIR>/<NAME>.json)
    #[arg(short = 't', long, value_name = "NAME")]
    pub destination: String,

    /// Directory holding server configuration files
    #[arg(short = 'd', long, value_name = "DIR")]
    pub config_dir: PathBuf,

    /// Clone only; do not set up replication
    #[arg(short = 'n', long)]
    pub no_replication: bool,

    /// Leave GTID_PURGED out of the dump
    #[arg(short = 'r', long, requires = "no_replication")]
    pub remove_gtid_purged: bool,

    /// Directory containing mysqldump and mysql
    #[arg(short = 'p', long, value_name = "DIR")]
    pub program_dir: Option<PathBuf>,

    /// Directory for the dump stderr capture (default: system temp dir)
    #[arg(long, value_name = "DIR")]
    pub capture_dir: Option<PathBuf>,

    /// Seconds to wait for replica threads after starting replication
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub replica_wait_secs: u64,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    pub fn to_options(&self) -> CloneOptions {
        let defaults = CloneOptions::default();
        CloneOptions {
            no_replication: self.no_replication,
            remove_gtid_purged: self.remove_gtid_purged,
            program_dir: self.program_dir.clone(),
            capture_dir: self.capture_dir.clone().unwrap_or(defaults.capture_dir),
            wait_policy: WaitPolicy::with_timeout(Duration::from_secs(self.replica_wait_secs)),
        }
    }
}

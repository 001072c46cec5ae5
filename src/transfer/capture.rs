//! Where the dump tool's stderr goes
//!
//! One file per run, named from the local start time and a run id so two
//! runs never share a capture. The file is left on disk for the operator.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, TimeZone};
use uuid::Uuid;

const PREFIX: &str = "dbclone_dump";
const EXTENSION: &str = "err";

/// Path of one run's stderr capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturePath {
    path: PathBuf,
    run_id: Uuid,
}

impl CapturePath {
    /// Fresh capture path under `dir` for a new run
    pub fn new(dir: &Path) -> Self {
        Self::for_run(dir, &Local::now(), Uuid::new_v4())
    }

    /// Capture path for a known start time and run id
    pub fn for_run<Tz: TimeZone>(dir: &Path, started: &DateTime<Tz>, run_id: Uuid) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        let name = format!(
            "{}_{}_{}.{}",
            PREFIX,
            started.format("%Y%m%d_%H%M%S"),
            run_id,
            EXTENSION
        );
        Self {
            path: dir.join(name),
            run_id,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }
}

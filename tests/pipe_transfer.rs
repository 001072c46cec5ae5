//! Pipe Transfer Tests
//!
//! Runs `PipeTransfer` against shell scripts standing in for `mysqldump`
//! and `mysql`:
//! - dump stdout reaches load stdin unchanged
//! - dump stderr lands in the capture file and is only advisory
//! - a non-zero exit from either tool fails the transfer
//! - a load that stops reading is blamed, not the dump it cut off

#![cfg(unix)]

mod common;

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use common::FakeServer;
use dbclone::server::{ConnectionParams, ServerHandle, ServerVersion};
use dbclone::transfer::{
    transfer, CapturePath, DataTransfer, DumpCommand, LoadCommand, PipeTransfer, ToolSet,
    TransferErrorCode, TransferPlan,
};
use tempfile::TempDir;

const DUMP_SQL: &str = "CREATE DATABASE app;\nINSERT INTO app.t VALUES (1);\n";

fn write_script(dir: &Path, name: &str, body: &str) {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
}

/// Dump script printing `DUMP_SQL`, recording its args, with extra shell.
fn fake_dump(dir: &Path, extra: &str) {
    write_script(
        dir,
        "mysqldump",
        &format!(
            "printf '%s\\n' \"$@\" > '{args}'\nprintf '{sql}'\n{extra}",
            args = dir.join("dump.args").display(),
            sql = DUMP_SQL.replace('\n', "\\n"),
            extra = extra,
        ),
    );
}

/// Load script saving its stdin, with extra shell.
fn fake_load(dir: &Path, extra: &str) {
    write_script(
        dir,
        "mysql",
        &format!(
            "cat > '{out}'\n{extra}",
            out = dir.join("loaded.sql").display(),
            extra = extra,
        ),
    );
}

fn plan(dir: &Path) -> TransferPlan {
    let tools = ToolSet::resolve(Some(dir));
    let source = ConnectionParams::new("db1", "10.0.0.1", "admin");
    let destination = ConnectionParams::new("db2", "10.0.0.2", "admin");
    TransferPlan {
        dump: DumpCommand::build(&tools, &source, &["--source-data=2".to_string()], false),
        load: LoadCommand::build(&tools, &destination),
        capture: CapturePath::new(dir),
    }
}

// =============================================================================
// Success Tests
// =============================================================================

/// Dump output is loaded byte for byte.
#[test]
fn test_dump_output_reaches_load() {
    let dir = TempDir::new().unwrap();
    fake_dump(dir.path(), "exit 0");
    fake_load(dir.path(), "exit 0");
    let plan = plan(dir.path());

    let outcome = PipeTransfer::new().run(&plan).unwrap();

    assert_eq!(fs::read_to_string(dir.path().join("loaded.sql")).unwrap(), DUMP_SQL);
    assert_eq!(outcome.capture_path, plan.capture.path());
    assert!(outcome.capture_path.exists());
    assert!(!outcome.had_error_output);

    let args = fs::read_to_string(dir.path().join("dump.args")).unwrap();
    let args: Vec<&str> = args.lines().collect();
    assert_eq!(args, plan.dump.args.iter().map(String::as_str).collect::<Vec<_>>());
}

/// Dump stderr is captured and flagged, but the transfer succeeds.
#[test]
fn test_dump_stderr_is_advisory() {
    let dir = TempDir::new().unwrap();
    fake_dump(
        dir.path(),
        "echo 'Warning: A partial dump from a server that has GTIDs' >&2\nexit 0",
    );
    fake_load(dir.path(), "exit 0");
    let plan = plan(dir.path());

    let outcome = PipeTransfer::new().run(&plan).unwrap();

    assert!(outcome.had_error_output);
    let captured = fs::read_to_string(&outcome.capture_path).unwrap();
    assert!(captured.contains("partial dump"));
}

// =============================================================================
// Failure Tests
// =============================================================================

/// Non-zero dump exit fails the transfer.
#[test]
fn test_dump_failure() {
    let dir = TempDir::new().unwrap();
    fake_dump(dir.path(), "exit 2");
    fake_load(dir.path(), "exit 0");

    let err = PipeTransfer::new().run(&plan(dir.path())).unwrap_err();
    assert_eq!(err.code(), TransferErrorCode::DbcloneTransferDumpFailed);
}

/// Non-zero load exit fails the transfer.
#[test]
fn test_load_failure() {
    let dir = TempDir::new().unwrap();
    fake_dump(dir.path(), "exit 0");
    fake_load(dir.path(), "exit 1");

    let err = PipeTransfer::new().run(&plan(dir.path())).unwrap_err();
    assert_eq!(err.code(), TransferErrorCode::DbcloneTransferLoadFailed);
}

/// A load that exits without reading is the failure reported, even though
/// the dump then dies writing into the closed pipe.
#[test]
fn test_load_rejecting_streaming_dump_reports_load() {
    let dir = TempDir::new().unwrap();
    write_script(dir.path(), "mysqldump", "head -c 20000000 /dev/zero");
    write_script(dir.path(), "mysql", "exit 1");

    let err = PipeTransfer::new().run(&plan(dir.path())).unwrap_err();
    assert_eq!(err.code(), TransferErrorCode::DbcloneTransferLoadFailed);
    assert!(err.message().contains("load tool exited with exit status: 1"));
    assert!(err.message().contains("dump tool"));
}

/// Same, with the dump killed by the signal itself.
#[test]
fn test_load_rejecting_dump_killed_by_sigpipe() {
    let dir = TempDir::new().unwrap();
    write_script(dir.path(), "mysqldump", "exec head -c 20000000 /dev/zero");
    write_script(dir.path(), "mysql", "exit 1");

    let err = PipeTransfer::new().run(&plan(dir.path())).unwrap_err();
    assert_eq!(err.code(), TransferErrorCode::DbcloneTransferLoadFailed);
}

/// A missing tool is a spawn failure.
#[test]
fn test_missing_dump_tool() {
    let dir = TempDir::new().unwrap();
    fake_load(dir.path(), "exit 0");

    let err = PipeTransfer::new().run(&plan(dir.path())).unwrap_err();
    assert_eq!(err.code(), TransferErrorCode::DbcloneTransferSpawn);
}

/// Missing load tool: the running dump is abandoned.
#[test]
fn test_missing_load_tool() {
    let dir = TempDir::new().unwrap();
    fake_dump(dir.path(), "exit 0");

    let err = PipeTransfer::new().run(&plan(dir.path())).unwrap_err();
    assert_eq!(err.code(), TransferErrorCode::DbcloneTransferSpawn);
    assert!(err.message().contains("mysql"));
}

// =============================================================================
// GTID Reset Tests
// =============================================================================

/// A GTID destination is reset before the pipe runs.
#[test]
fn test_transfer_resets_gtid_destination() {
    let dir = TempDir::new().unwrap();
    fake_dump(dir.path(), "exit 0");
    fake_load(dir.path(), "exit 0");
    let mut destination = FakeServer::destination(ServerVersion::new(8, 4, 0), true);
    destination.connect().unwrap();

    transfer(&mut PipeTransfer::new(), &mut destination, &plan(dir.path())).unwrap();

    assert_eq!(destination.executed, vec!["RESET BINARY LOGS AND GTIDS"]);
}

/// A non-GTID destination is left alone.
#[test]
fn test_transfer_leaves_non_gtid_destination() {
    let dir = TempDir::new().unwrap();
    fake_dump(dir.path(), "exit 0");
    fake_load(dir.path(), "exit 0");
    let mut destination = FakeServer::destination(ServerVersion::new(5, 7, 0), false);
    destination.connect().unwrap();

    transfer(&mut PipeTransfer::new(), &mut destination, &plan(dir.path())).unwrap();

    assert!(destination.executed.is_empty());
}

/// A failed reset stops the transfer before any tool runs.
#[test]
fn test_failed_gtid_reset_skips_pipe() {
    let dir = TempDir::new().unwrap();
    fake_dump(dir.path(), "exit 0");
    fake_load(dir.path(), "exit 0");
    let mut destination = FakeServer::destination(ServerVersion::new(8, 0, 28), true);

    let err = transfer(&mut PipeTransfer::new(), &mut destination, &plan(dir.path())).unwrap_err();

    assert_eq!(err.code(), TransferErrorCode::DbcloneTransferGtidReset);
    assert!(!dir.path().join("loaded.sql").exists());
}

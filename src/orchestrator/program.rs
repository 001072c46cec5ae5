//! The clone run
//!
//! ```text
//! connect source -> connect destination -> check topology
//!   -> stop/clear existing link -> prepare dump flags
//!   -> [replica] point destination at source
//!   -> transfer
//!   -> [replica] reconnect if needed -> start replication -> wait -> verify
//!   -> DONE
//! ```
//!
//! Any error moves to FAILED. Both handles are disconnected exactly once
//! on every path, here and nowhere else.

use crate::observability::{log_event_with_fields, Event, Logger};
use crate::replication::{
    configure_link, log_report, prepare, start_replication, stop_and_clear_existing_link,
    suppress_gtid_purged, verify, wait_for_replica_threads, ReplicationError, Requirements,
};
use crate::server::{ReplicaRole, ServerHandle, ServerRole, SourceRole};
use crate::transfer::{self, CapturePath, DataTransfer, DumpCommand, LoadCommand, ToolSet, TransferPlan};

use super::errors::CloneResult;
use super::options::CloneOptions;
use super::report::{CloneMode, CloneReport};

/// Clone `source` into `destination`, optionally wiring replication.
pub fn run_program(
    options: &CloneOptions,
    source: &mut dyn ServerHandle,
    destination: &mut dyn ServerHandle,
    transfer: &mut dyn DataTransfer,
) -> CloneResult<CloneReport> {
    log_event_with_fields(
        Event::CloneStart,
        &[
            ("source", source.name()),
            ("destination", destination.name()),
            ("replication", if options.want_replication() { "on" } else { "off" }),
        ],
    );

    let result = execute(options, source, destination, transfer);

    source.disconnect();
    log_event_with_fields(Event::ServerDisconnected, &[("server", source.name())]);
    destination.disconnect();
    log_event_with_fields(Event::ServerDisconnected, &[("server", destination.name())]);

    match &result {
        Ok(report) => {
            let healthy = report.is_healthy().to_string();
            log_event_with_fields(Event::CloneComplete, &[("healthy", &healthy)]);
        }
        Err(e) => {
            log_event_with_fields(
                Event::CloneFailed,
                &[("code", e.code()), ("reason", &e.to_string())],
            );
        }
    }

    result
}

fn execute(
    options: &CloneOptions,
    source: &mut dyn ServerHandle,
    destination: &mut dyn ServerHandle,
    runner: &mut dyn DataTransfer,
) -> CloneResult<CloneReport> {
    options.validate()?;
    let want_replication = options.want_replication();

    connect(source, ServerRole::Source)?;
    connect(destination, ServerRole::Destination)?;

    if want_replication {
        check_topology(source, destination)?;
    }

    let link_action = stop_and_clear_existing_link(destination, want_replication)?;

    let requirements = Requirements::for_versions(source.version(), destination.version());
    let plan = prepare(source, destination, &requirements, want_replication)?;
    if !plan.ok {
        return Err(ReplicationError::requirement_mismatch(plan.diagnostics()).into());
    }
    let warnings = plan.diagnostics();

    // The load may end with the dump's own coordinate statement; it has to
    // land after the connection settings.
    if want_replication {
        configure_link(source, destination)?;
    }

    let tools = ToolSet::resolve(options.program_dir.as_deref());
    let suppress = suppress_gtid_purged(
        options.remove_gtid_purged,
        want_replication,
        source.gtid_mode(),
        destination.gtid_mode(),
    );
    let transfer_plan = TransferPlan {
        dump: DumpCommand::build(&tools, source.params(), &plan.dump_tail, suppress),
        load: LoadCommand::build(&tools, destination.params()),
        capture: CapturePath::new(&options.capture_dir),
    };
    let outcome = transfer::transfer(runner, destination, &transfer_plan)?;

    let mut report = CloneReport {
        mode: CloneMode::Standalone,
        source: source.name().to_string(),
        destination: destination.name().to_string(),
        link_action,
        dump_args: transfer_plan.dump.redacted_args(),
        warnings,
        transfer: outcome,
        reconnected: false,
        wait: None,
        verification: None,
    };

    if !want_replication {
        return Ok(report);
    }

    report.mode = CloneMode::Replica;
    report.reconnected = ensure_connected(source)? | ensure_connected(destination)?;

    start_replication(source, destination)?;
    report.wait = Some(wait_for_replica_threads(destination, &options.wait_policy)?);

    let mut source_role = SourceRole::new(source);
    source_role.refresh()?;
    let source_snapshot = source_role.snapshot();

    let mut replica_role = ReplicaRole::new(destination);
    replica_role.refresh()?;
    let replica_snapshots: Vec<_> = replica_role.snapshot().into_iter().collect();

    let verification = verify(source_snapshot.as_ref(), &replica_snapshots);
    log_report(&verification);
    report.verification = Some(verification);

    Ok(report)
}

fn connect(server: &mut dyn ServerHandle, role: ServerRole) -> CloneResult<()> {
    if let Err(e) = server.connect() {
        log_event_with_fields(
            Event::ServerConnectionFailed,
            &[("server", server.name()), ("role", role.as_str()), ("reason", &e.to_string())],
        );
        return Err(e.into());
    }

    let version = server.version().to_string();
    let gtid_mode = server.gtid_mode().to_string();
    log_event_with_fields(
        Event::ServerConnected,
        &[
            ("server", server.name()),
            ("role", role.as_str()),
            ("version", &version),
            ("gtid_mode", &gtid_mode),
        ],
    );
    Ok(())
}

/// Reject pairings that cannot replicate.
fn check_topology(
    source: &dyn ServerHandle,
    destination: &dyn ServerHandle,
) -> CloneResult<()> {
    let rejection = if source.params().is_loopback() {
        Some(ReplicationError::loopback_source(&source.params().host))
    } else if source.gtid_mode() != destination.gtid_mode() {
        Some(ReplicationError::gtid_mode_mismatch(
            source.gtid_mode(),
            destination.gtid_mode(),
        ))
    } else if source.params().replication.is_none() {
        Some(ReplicationError::missing_credentials(source.name()))
    } else {
        None
    };

    match rejection {
        Some(err) => {
            log_event_with_fields(
                Event::TopologyRejected,
                &[("code", err.kind.code()), ("reason", &err.message)],
            );
            Err(err.into())
        }
        None => Ok(()),
    }
}

/// Re-open a session lost during the transfer. One attempt only.
fn ensure_connected(server: &mut dyn ServerHandle) -> CloneResult<bool> {
    if server.is_connected() {
        return Ok(false);
    }

    Logger::warn("SERVER_SESSION_LOST", &[("server", server.name())]);
    server.reconnect()?;
    log_event_with_fields(Event::ServerReconnected, &[("server", server.name())]);
    Ok(true)
}

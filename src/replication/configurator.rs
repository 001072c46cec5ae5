//! Replication wiring decisions
//!
//! Decides the dump-time replication coordinate flag, gates replication on
//! both servers meeting their requirements, and changes the destination's
//! replication link before and after the transfer.
//!
//! `prepare` never disconnects anything. On a failed gate it returns a plan
//! with `ok == false` and the orchestrator, which owns both sessions, closes
//! them.

use serde::Serialize;

use crate::observability::{log_event_with_fields, Event};
use crate::server::{statements, ServerHandle, ServerResult, ServerRole, ServerVersion};

use super::errors::{ReplicationError, ReplicationResult};
use super::requirements::{requirements_for, RequirementSet};
use super::validator::{validate, Diagnostic, ValidationResult};

/// Value given to the dump tool's replication coordinate flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CoordinateMode {
    /// `=1`: dump embeds an active `CHANGE MASTER TO` at the dump position
    EmbedChangeSource,
    /// `=2`: coordinate written as a comment only
    CommentOnly,
}

impl CoordinateMode {
    pub fn value(&self) -> u8 {
        match self {
            CoordinateMode::EmbedChangeSource => 1,
            CoordinateMode::CommentOnly => 2,
        }
    }
}

/// `--master-data` before 8.0.26, `--source-data` from 8.0.26 on
pub fn dump_data_flag(source_version: ServerVersion) -> &'static str {
    if source_version.at_least(ServerVersion::SOURCE_NAMING) {
        "--source-data"
    } else {
        "--master-data"
    }
}

/// Full dump argument for `mode` against a source at `source_version`
pub fn coordinate_arg(source_version: ServerVersion, mode: CoordinateMode) -> String {
    format!("{}={}", dump_data_flag(source_version), mode.value())
}

/// Requirement sets for one run, chosen from each server's version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirements {
    pub source: RequirementSet,
    pub destination: RequirementSet,
}

impl Requirements {
    pub fn for_versions(source: ServerVersion, destination: ServerVersion) -> Self {
        Self {
            source: requirements_for(ServerRole::Source, source),
            destination: requirements_for(ServerRole::Destination, destination),
        }
    }
}

/// Dump flags and gate outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplicationPlan {
    /// Arguments appended after the static dump arguments
    pub dump_tail: Vec<String>,
    /// False when a requirement gate failed; the transfer must not run
    pub ok: bool,
    pub source_check: Option<ValidationResult>,
    pub destination_check: Option<ValidationResult>,
}

impl ReplicationPlan {
    /// Every diagnostic from both checks, source first
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.source_check
            .iter()
            .chain(self.destination_check.iter())
            .flat_map(|check| check.diagnostics.iter().cloned())
            .collect()
    }
}

/// Decide the dump coordinate flag, gating replication on requirements.
///
/// Without replication the coordinate is always comment-only. With
/// replication both servers are checked; on success GTID destinations get
/// comment-only (auto-positioning finds the start) and others get the
/// embedded `CHANGE MASTER TO`.
pub fn prepare(
    source: &mut dyn ServerHandle,
    destination: &mut dyn ServerHandle,
    requirements: &Requirements,
    want_replication: bool,
) -> ServerResult<ReplicationPlan> {
    let source_version = source.version();

    if !want_replication {
        return Ok(ReplicationPlan {
            dump_tail: vec![coordinate_arg(source_version, CoordinateMode::CommentOnly)],
            ok: true,
            source_check: None,
            destination_check: None,
        });
    }

    let source_live = source.global_variables(&requirements.source.names())?;
    let destination_live = destination.global_variables(&requirements.destination.names())?;

    let source_check = validate(&source_live, &requirements.source);
    let destination_check = validate(&destination_live, &requirements.destination);

    for diagnostic in source_check
        .diagnostics
        .iter()
        .chain(destination_check.diagnostics.iter())
    {
        diagnostic.log();
    }

    if !source_check.passed || !destination_check.passed {
        log_event_with_fields(
            Event::RequirementsFailed,
            &[("source", source.name()), ("destination", destination.name())],
        );
        return Ok(ReplicationPlan {
            dump_tail: Vec::new(),
            ok: false,
            source_check: Some(source_check),
            destination_check: Some(destination_check),
        });
    }

    log_event_with_fields(
        Event::RequirementsPassed,
        &[("source", source.name()), ("destination", destination.name())],
    );

    let mode = if destination.gtid_mode() {
        CoordinateMode::CommentOnly
    } else {
        CoordinateMode::EmbedChangeSource
    };

    Ok(ReplicationPlan {
        dump_tail: vec![coordinate_arg(source_version, mode)],
        ok: true,
        source_check: Some(source_check),
        destination_check: Some(destination_check),
    })
}

/// Whether the dump must not carry `SET @@GLOBAL.GTID_PURGED`.
///
/// Explicitly requested by the operator, or forced when a standalone clone
/// goes from a GTID source to a non-GTID destination, which cannot accept
/// the source's transaction history.
pub fn suppress_gtid_purged(
    requested: bool,
    want_replication: bool,
    source_gtid: bool,
    destination_gtid: bool,
) -> bool {
    requested || (!want_replication && source_gtid && !destination_gtid)
}

/// What `stop_and_clear_existing_link` did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LinkAction {
    /// No link was configured
    Untouched,
    /// Threads stopped, configuration kept
    Stopped,
    /// Threads stopped and configuration removed
    Cleared,
}

/// Stop any replication link on the destination, and remove it when the
/// destination will be a standalone clone. A destination without a link is
/// left alone.
pub fn stop_and_clear_existing_link(
    destination: &mut dyn ServerHandle,
    want_replication: bool,
) -> ServerResult<LinkAction> {
    if destination.replica_status()?.is_none() {
        return Ok(LinkAction::Untouched);
    }

    let version = destination.version();
    destination.execute(statements::stop_replica(version))?;
    log_event_with_fields(Event::ReplicaLinkStopped, &[("server", destination.name())]);

    if want_replication {
        return Ok(LinkAction::Stopped);
    }

    destination.execute(statements::reset_replica_all(version))?;
    log_event_with_fields(Event::ReplicaLinkCleared, &[("server", destination.name())]);

    Ok(LinkAction::Cleared)
}

/// Point the destination at the source without starting it.
///
/// Runs before the transfer. A position-based load ends with the dump's own
/// coordinate-only change statement, which must be the last one applied:
/// changing host or port afterwards resets the coordinate to the start of
/// the first binary log. GTID destinations get auto-positioning instead.
pub fn configure_link(
    source: &dyn ServerHandle,
    destination: &mut dyn ServerHandle,
) -> ReplicationResult<()> {
    let params = source.params();
    let credentials = params
        .replication
        .as_ref()
        .ok_or_else(|| ReplicationError::missing_credentials(source.name()))?;

    let version = destination.version();
    let auto_position = destination.gtid_mode();
    let change = statements::change_source(version, params, credentials, auto_position);

    destination.execute(&change).map_err(|e| {
        ReplicationError::link_statement_failed(format!("change source failed: {}", e))
    })?;

    let auto_position = auto_position.to_string();
    log_event_with_fields(
        Event::ReplicaLinkConfigured,
        &[
            ("source", source.name()),
            ("replica", destination.name()),
            ("auto_position", &auto_position),
        ],
    );
    Ok(())
}

/// Start the replication threads of a link set up by `configure_link`.
pub fn start_replication(
    source: &dyn ServerHandle,
    destination: &mut dyn ServerHandle,
) -> ReplicationResult<()> {
    let version = destination.version();
    destination
        .execute(statements::start_replica(version))
        .map_err(|e| {
            ReplicationError::link_statement_failed(format!("start replica failed: {}", e))
        })?;

    log_event_with_fields(
        Event::ReplicationStarted,
        &[("source", source.name()), ("replica", destination.name())],
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_data_flag_switches_at_8_0_26() {
        assert_eq!(dump_data_flag(ServerVersion::new(5, 7, 0)), "--master-data");
        assert_eq!(dump_data_flag(ServerVersion::new(8, 0, 24)), "--master-data");
        assert_eq!(dump_data_flag(ServerVersion::new(8, 0, 26)), "--source-data");
        assert_eq!(dump_data_flag(ServerVersion::new(8, 0, 28)), "--source-data");
    }

    #[test]
    fn test_coordinate_arg() {
        assert_eq!(
            coordinate_arg(ServerVersion::new(5, 7, 0), CoordinateMode::EmbedChangeSource),
            "--master-data=1"
        );
        assert_eq!(
            coordinate_arg(ServerVersion::new(8, 0, 28), CoordinateMode::CommentOnly),
            "--source-data=2"
        );
    }

    #[test]
    fn test_suppress_gtid_purged() {
        // explicit request always wins
        assert!(suppress_gtid_purged(true, false, false, false));
        // standalone clone from GTID source into non-GTID destination
        assert!(suppress_gtid_purged(false, false, true, false));
        // same modes, nothing to suppress
        assert!(!suppress_gtid_purged(false, false, true, true));
        assert!(!suppress_gtid_purged(false, false, false, false));
        // replication keeps GTID history intact
        assert!(!suppress_gtid_purged(false, true, true, false));
    }

    #[test]
    fn test_requirements_for_versions() {
        let reqs = Requirements::for_versions(ServerVersion::new(5, 7, 0), ServerVersion::new(8, 0, 28));
        assert!(reqs.source.get("innodb_support_xa").is_some());
        assert!(reqs.destination.get("log_replica_updates").is_some());
    }
}

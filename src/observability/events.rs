//! Lifecycle events emitted by a clone run
//!
//! Events are explicit and typed. Free-form event names are reserved for
//! `ObservationScope` and verifier findings.

use std::fmt;

/// Observable events in a clone run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Clone run begins
    CloneStart,
    /// Clone run reached DONE
    CloneComplete,
    /// Clone run reached FAILED
    CloneFailed,

    // Configuration
    /// Server configuration file loaded
    ConfigLoaded,
    /// Server configuration file rejected
    ConfigInvalid,

    // Connections
    /// Server session established
    ServerConnected,
    /// Server session could not be established
    ServerConnectionFailed,
    /// Server session re-established after idle loss
    ServerReconnected,
    /// Server session closed
    ServerDisconnected,

    // Topology
    /// Source/destination pairing rejected before transfer
    TopologyRejected,

    // Existing replication link
    /// Replication threads on the destination stopped
    ReplicaLinkStopped,
    /// Replication configuration on the destination removed
    ReplicaLinkCleared,
    /// Destination pointed at the source ahead of the load
    ReplicaLinkConfigured,

    // Requirement checks
    /// Server variable differs in an advisory-only way
    RequirementWarning,
    /// Server variable missing or wrong
    RequirementViolation,
    /// Both roles meet replication requirements
    RequirementsPassed,
    /// At least one role fails replication requirements
    RequirementsFailed,

    // Transfer
    /// Destination GTID history cleared ahead of the load
    GtidStateReset,
    /// Dump tool wrote to stderr
    DumpStderrCaptured,

    // Replication
    /// Replica threads started against the source
    ReplicationStarted,
    /// Replica threads did not appear within the wait budget
    ReplicaWaitTimedOut,
    /// Replica is healthy and caught up
    ReplicaHealthy,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::CloneStart => "CLONE_BEGIN",
            Event::CloneComplete => "CLONE_COMPLETE",
            Event::CloneFailed => "CLONE_FAILED",

            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ConfigInvalid => "CONFIG_INVALID",

            Event::ServerConnected => "SERVER_CONNECTED",
            Event::ServerConnectionFailed => "SERVER_CONNECTION_FAILED",
            Event::ServerReconnected => "SERVER_RECONNECTED",
            Event::ServerDisconnected => "SERVER_DISCONNECTED",

            Event::TopologyRejected => "TOPOLOGY_REJECTED",

            Event::ReplicaLinkStopped => "REPLICA_LINK_STOPPED",
            Event::ReplicaLinkCleared => "REPLICA_LINK_CLEARED",
            Event::ReplicaLinkConfigured => "REPLICA_LINK_CONFIGURED",

            Event::RequirementWarning => "REQUIREMENT_WARNING",
            Event::RequirementViolation => "REQUIREMENT_VIOLATION",
            Event::RequirementsPassed => "REQUIREMENTS_PASSED",
            Event::RequirementsFailed => "REQUIREMENTS_FAILED",

            Event::GtidStateReset => "GTID_STATE_RESET",
            Event::DumpStderrCaptured => "DUMP_STDERR_CAPTURED",

            Event::ReplicationStarted => "REPLICATION_STARTED",
            Event::ReplicaWaitTimedOut => "REPLICA_WAIT_TIMED_OUT",
            Event::ReplicaHealthy => "REPLICA_HEALTHY",
        }
    }

    /// Returns true if this event reports a hard failure of the run
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Event::CloneFailed
                | Event::ConfigInvalid
                | Event::ServerConnectionFailed
                | Event::TopologyRejected
                | Event::RequirementViolation
                | Event::RequirementsFailed
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_screaming_snake_case() {
        let events = [
            Event::CloneStart,
            Event::CloneComplete,
            Event::CloneFailed,
            Event::ConfigLoaded,
            Event::ConfigInvalid,
            Event::ServerConnected,
            Event::ServerConnectionFailed,
            Event::ServerReconnected,
            Event::ServerDisconnected,
            Event::TopologyRejected,
            Event::ReplicaLinkStopped,
            Event::ReplicaLinkCleared,
            Event::ReplicaLinkConfigured,
            Event::RequirementWarning,
            Event::RequirementViolation,
            Event::RequirementsPassed,
            Event::RequirementsFailed,
            Event::GtidStateReset,
            Event::DumpStderrCaptured,
            Event::ReplicationStarted,
            Event::ReplicaWaitTimedOut,
            Event::ReplicaHealthy,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_fatal_events() {
        assert!(Event::CloneFailed.is_fatal());
        assert!(Event::TopologyRejected.is_fatal());
        assert!(Event::ConfigInvalid.is_fatal());
        assert!(Event::ServerConnectionFailed.is_fatal());
        assert!(Event::RequirementViolation.is_fatal());
        assert!(!Event::ServerConnected.is_fatal());
        assert!(!Event::RequirementWarning.is_fatal());
        assert!(!Event::DumpStderrCaptured.is_fatal());
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::CloneStart), "CLONE_BEGIN");
        assert_eq!(format!("{}", Event::GtidStateReset), "GTID_STATE_RESET");
    }
}

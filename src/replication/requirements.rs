//! Required server variables per role
//!
//! Two revisions exist because MySQL 8.0.26 renamed the master/slave
//! variables to source/replica. The revision is chosen from each server's
//! own version once per run; entries may also carry the version that removed
//! them from the server.

use crate::server::{ServerRole, ServerVersion};

/// How a mismatch on one variable is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enforcement {
    /// Mismatch fails validation
    Required,
    /// Mismatch is reported as a warning only
    Advisory,
}

/// One required variable value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement {
    pub name: &'static str,
    pub value: &'static str,
    pub enforcement: Enforcement,
    /// First server version that no longer has this variable
    pub removed_in: Option<ServerVersion>,
}

impl Requirement {
    pub const fn required(name: &'static str, value: &'static str) -> Self {
        Self {
            name,
            value,
            enforcement: Enforcement::Required,
            removed_in: None,
        }
    }

    pub const fn advisory(name: &'static str, value: &'static str) -> Self {
        Self {
            name,
            value,
            enforcement: Enforcement::Advisory,
            removed_in: None,
        }
    }

    pub const fn removed_in(self, version: ServerVersion) -> Self {
        Self {
            removed_in: Some(version),
            ..self
        }
    }

    fn applies_to(&self, version: ServerVersion) -> bool {
        match self.removed_in {
            Some(removed) => version < removed,
            None => true,
        }
    }
}

/// Table revision, selected by server version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Revision {
    /// master/slave variable names
    Legacy,
    /// source/replica variable names (8.0.26+)
    Current,
}

impl Revision {
    pub fn for_version(version: ServerVersion) -> Self {
        if version.at_least(ServerVersion::SOURCE_NAMING) {
            Revision::Current
        } else {
            Revision::Legacy
        }
    }
}

const LEGACY_SOURCE: &[Requirement] = &[
    Requirement::required("log_bin", "ON"),
    Requirement::required("sync_binlog", "1"),
    Requirement::required("innodb_flush_log_at_trx_commit", "1"),
    Requirement::required("innodb_support_xa", "ON").removed_in(ServerVersion::new(8, 0, 0)),
    Requirement::required("binlog_format", "ROW"),
];

const LEGACY_DESTINATION: &[Requirement] = &[
    Requirement::required("log_bin", "ON"),
    Requirement::advisory("read_only", "ON"),
    Requirement::required("log_slave_updates", "ON"),
    Requirement::required("sync_master_info", "1"),
    Requirement::required("sync_relay_log", "1"),
    Requirement::required("sync_relay_log_info", "1"),
];

const CURRENT_SOURCE: &[Requirement] = &[
    Requirement::required("log_bin", "ON"),
    Requirement::required("sync_binlog", "1"),
    Requirement::required("innodb_flush_log_at_trx_commit", "1"),
    Requirement::required("binlog_format", "ROW"),
];

const CURRENT_DESTINATION: &[Requirement] = &[
    Requirement::required("log_bin", "ON"),
    Requirement::advisory("read_only", "ON"),
    Requirement::required("log_replica_updates", "ON"),
    Requirement::required("sync_source_info", "1"),
    Requirement::required("sync_relay_log", "1"),
    Requirement::required("sync_relay_log_info", "1"),
];

/// Ordered, immutable set of variables one role must carry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementSet {
    role: ServerRole,
    entries: Vec<Requirement>,
}

impl RequirementSet {
    pub fn new(role: ServerRole, entries: Vec<Requirement>) -> Self {
        Self { role, entries }
    }

    pub fn role(&self) -> ServerRole {
        self.role
    }

    pub fn iter(&self) -> impl Iterator<Item = &Requirement> {
        self.entries.iter()
    }

    /// Variable names, in table order
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|r| r.name).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Requirement> {
        self.entries.iter().find(|r| r.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Requirements `role` must meet on a server running `version`.
pub fn requirements_for(role: ServerRole, version: ServerVersion) -> RequirementSet {
    let table = match (role, Revision::for_version(version)) {
        (ServerRole::Source, Revision::Legacy) => LEGACY_SOURCE,
        (ServerRole::Source, Revision::Current) => CURRENT_SOURCE,
        (ServerRole::Destination, Revision::Legacy) => LEGACY_DESTINATION,
        (ServerRole::Destination, Revision::Current) => CURRENT_DESTINATION,
    };

    RequirementSet::new(
        role,
        table
            .iter()
            .filter(|r| r.applies_to(version))
            .copied()
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_source_on_5_7() {
        let set = requirements_for(ServerRole::Source, ServerVersion::new(5, 7, 0));
        assert_eq!(
            set.names(),
            vec![
                "log_bin",
                "sync_binlog",
                "innodb_flush_log_at_trx_commit",
                "innodb_support_xa",
                "binlog_format",
            ]
        );
    }

    #[test]
    fn test_removed_variable_dropped_on_early_8_0() {
        let set = requirements_for(ServerRole::Source, ServerVersion::new(8, 0, 24));
        assert!(set.get("innodb_support_xa").is_none());
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn test_destination_names_switch_at_8_0_26() {
        let legacy = requirements_for(ServerRole::Destination, ServerVersion::new(8, 0, 25));
        assert!(legacy.get("log_slave_updates").is_some());
        assert!(legacy.get("sync_master_info").is_some());

        let current = requirements_for(ServerRole::Destination, ServerVersion::new(8, 0, 26));
        assert!(current.get("log_replica_updates").is_some());
        assert!(current.get("sync_source_info").is_some());
        assert!(current.get("log_slave_updates").is_none());
    }

    #[test]
    fn test_read_only_is_the_only_advisory_entry() {
        for version in [ServerVersion::new(5, 7, 0), ServerVersion::new(8, 0, 28)] {
            for role in [ServerRole::Source, ServerRole::Destination] {
                let advisory: Vec<_> = requirements_for(role, version)
                    .iter()
                    .filter(|r| r.enforcement == Enforcement::Advisory)
                    .map(|r| r.name)
                    .collect();

                match role {
                    ServerRole::Source => assert!(advisory.is_empty()),
                    ServerRole::Destination => assert_eq!(advisory, vec!["read_only"]),
                }
            }
        }
    }

    #[test]
    fn test_set_reports_its_role() {
        let set = requirements_for(ServerRole::Destination, ServerVersion::new(8, 0, 28));
        assert_eq!(set.role(), ServerRole::Destination);
        assert!(!set.is_empty());
    }
}

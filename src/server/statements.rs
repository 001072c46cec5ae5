//! Version-aware replication statements
//!
//! MySQL renamed its replication statements across 8.0.22 through 8.4.0. Every
//! builder picks the spelling the target server understands.

use super::params::{ConnectionParams, ReplicationCredentials};
use super::version::ServerVersion;

/// `SHOW SLAVE STATUS` / `SHOW REPLICA STATUS`
pub fn show_replica_status(version: ServerVersion) -> &'static str {
    if version.at_least(ServerVersion::REPLICA_STATEMENTS) {
        "SHOW REPLICA STATUS"
    } else {
        "SHOW SLAVE STATUS"
    }
}

/// `SHOW MASTER STATUS` / `SHOW BINARY LOG STATUS`
pub fn show_source_status(version: ServerVersion) -> &'static str {
    if version.at_least(ServerVersion::BINARY_LOG_STATEMENTS) {
        "SHOW BINARY LOG STATUS"
    } else {
        "SHOW MASTER STATUS"
    }
}

pub fn stop_replica(version: ServerVersion) -> &'static str {
    if version.at_least(ServerVersion::REPLICA_STATEMENTS) {
        "STOP REPLICA"
    } else {
        "STOP SLAVE"
    }
}

pub fn start_replica(version: ServerVersion) -> &'static str {
    if version.at_least(ServerVersion::REPLICA_STATEMENTS) {
        "START REPLICA"
    } else {
        "START SLAVE"
    }
}

/// Remove every trace of the replication link
pub fn reset_replica_all(version: ServerVersion) -> &'static str {
    if version.at_least(ServerVersion::REPLICA_STATEMENTS) {
        "RESET REPLICA ALL"
    } else {
        "RESET SLAVE ALL"
    }
}

/// Clear binary logs and the executed GTID set
pub fn reset_gtid_state(version: ServerVersion) -> &'static str {
    if version.at_least(ServerVersion::BINARY_LOG_STATEMENTS) {
        "RESET BINARY LOGS AND GTIDS"
    } else {
        "RESET MASTER"
    }
}

/// Point a replica at `source`.
///
/// With GTID auto-positioning the replica finds its own start point. Without
/// it, no coordinate is set here: MySQL resets the coordinate whenever host or
/// port change, so this must run before the load applies the dump's
/// coordinate-only statement.
pub fn change_source(
    replica_version: ServerVersion,
    source: &ConnectionParams,
    credentials: &ReplicationCredentials,
    auto_position: bool,
) -> String {
    let modern = replica_version.at_least(ServerVersion::CHANGE_SOURCE_STATEMENT);
    let (head, prefix) = if modern {
        ("CHANGE REPLICATION SOURCE TO", "SOURCE")
    } else {
        ("CHANGE MASTER TO", "MASTER")
    };

    let mut statement = format!(
        "{} {p}_HOST={}, {p}_PORT={}, {p}_USER={}, {p}_PASSWORD={}",
        head,
        quote(&source.host),
        source.port,
        quote(&credentials.user),
        quote(&credentials.password),
        p = prefix,
    );

    if auto_position {
        statement.push_str(&format!(", {}_AUTO_POSITION=1", prefix));
    }

    statement
}

/// SQL string literal with `'` and `\` escaped
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        match c {
            '\'' => quoted.push_str("\\'"),
            '\\' => quoted.push_str("\\\\"),
            c => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

/// `SHOW GLOBAL VARIABLES` restricted to the given names
pub fn show_global_variables(names: &[&str]) -> String {
    let list: Vec<String> = names.iter().map(|n| quote(n)).collect();
    format!(
        "SHOW GLOBAL VARIABLES WHERE Variable_name IN ({})",
        list.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(major: u32, minor: u32, patch: u32) -> ServerVersion {
        ServerVersion::new(major, minor, patch)
    }

    #[test]
    fn test_replica_statements_switch_at_8_0_22() {
        assert_eq!(stop_replica(v(8, 0, 21)), "STOP SLAVE");
        assert_eq!(stop_replica(v(8, 0, 22)), "STOP REPLICA");
        assert_eq!(start_replica(v(5, 7, 44)), "START SLAVE");
        assert_eq!(reset_replica_all(v(8, 0, 30)), "RESET REPLICA ALL");
        assert_eq!(show_replica_status(v(5, 7, 44)), "SHOW SLAVE STATUS");
    }

    #[test]
    fn test_binary_log_statements_switch_at_8_4() {
        assert_eq!(reset_gtid_state(v(8, 0, 36)), "RESET MASTER");
        assert_eq!(reset_gtid_state(v(8, 4, 0)), "RESET BINARY LOGS AND GTIDS");
        assert_eq!(show_source_status(v(8, 4, 2)), "SHOW BINARY LOG STATUS");
    }

    #[test]
    fn test_change_master_legacy_without_auto_position() {
        let source = ConnectionParams::new("db1", "10.0.0.5", "root");
        let creds = ReplicationCredentials {
            user: "repl".into(),
            password: "p'w".into(),
        };

        let statement = change_source(v(5, 7, 44), &source, &creds, false);
        assert_eq!(
            statement,
            "CHANGE MASTER TO MASTER_HOST='10.0.0.5', MASTER_PORT=3306, \
             MASTER_USER='repl', MASTER_PASSWORD='p\\'w'"
        );
    }

    #[test]
    fn test_change_source_modern_with_auto_position() {
        let source = ConnectionParams::new("db1", "10.0.0.5", "root");
        let creds = ReplicationCredentials {
            user: "repl".into(),
            password: "pw".into(),
        };

        let statement = change_source(v(8, 0, 28), &source, &creds, true);
        assert!(statement.starts_with("CHANGE REPLICATION SOURCE TO SOURCE_HOST='10.0.0.5'"));
        assert!(statement.ends_with(", SOURCE_AUTO_POSITION=1"));
    }

    #[test]
    fn test_show_global_variables() {
        assert_eq!(
            show_global_variables(&["log_bin", "read_only"]),
            "SHOW GLOBAL VARIABLES WHERE Variable_name IN ('log_bin', 'read_only')"
        );
    }
}

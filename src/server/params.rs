//! Connection parameters shared by the server session and the external tools

use std::net::IpAddr;
use std::path::PathBuf;

/// Account the replica uses to pull the source's binary log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplicationCredentials {
    pub user: String,
    pub password: String,
}

/// How to reach one server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    /// Operator-facing server name
    pub name: String,
    pub host: String,
    pub port: u16,
    pub user: String,
    /// Only used when no defaults-extra-file is configured
    pub password: Option<String>,
    /// Client option file carrying credentials and socket
    pub defaults_extra_file: Option<PathBuf>,
    /// Present on servers that can act as a replication source
    pub replication: Option<ReplicationCredentials>,
}

impl ConnectionParams {
    /// Create parameters with the default MySQL port and no credentials file.
    pub fn new(name: impl Into<String>, host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port: 3306,
            user: user.into(),
            password: None,
            defaults_extra_file: None,
            replication: None,
        }
    }

    /// Argument set identifying this server to `mysql` / `mysqldump`.
    ///
    /// `--defaults-extra-file` must be the first option the tools see, so it
    /// leads the list when configured.
    pub fn client_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(5);

        if let Some(ref file) = self.defaults_extra_file {
            args.push(format!("--defaults-extra-file={}", file.display()));
        }

        args.push(format!("--user={}", self.user));
        args.push(format!("--host={}", self.host));
        args.push(format!("--port={}", self.port));

        if self.defaults_extra_file.is_none() {
            if let Some(ref password) = self.password {
                args.push(format!("--password={}", password));
            }
        }

        args
    }

    /// Returns true if the host names this machine's loopback interface.
    pub fn is_loopback(&self) -> bool {
        let host = self.host.trim();
        if host.eq_ignore_ascii_case("localhost") {
            return true;
        }

        host.trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .map(|ip| ip.is_loopback())
            .unwrap_or(false)
    }
}

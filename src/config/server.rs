//! One server's connection configuration, stored as `<dir>/<name>.json`

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::observability::{log_event_with_fields, Event};
use crate::server::{ConnectionParams, ReplicationCredentials};

use super::errors::{ConfigError, ConfigResult};

/// Server entry as written by the operator
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Defaults to the file stem
    #[serde(default)]
    pub name: String,

    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    pub user: String,

    /// Ignored when `extra_def_file` is set
    #[serde(default)]
    pub password: Option<String>,

    /// Client option file carrying credentials
    #[serde(default)]
    pub extra_def_file: Option<PathBuf>,

    #[serde(default)]
    pub server_id: Option<u32>,

    /// Account a replica uses to connect to this server
    #[serde(default)]
    pub rep_user: Option<String>,

    #[serde(default)]
    pub rep_password: Option<String>,

    #[serde(default)]
    pub serv_os: Option<String>,

    /// Server's own option file, informational
    #[serde(default)]
    pub cfg_file: Option<PathBuf>,
}

fn default_port() -> u16 {
    3306
}

impl ServerConfig {
    /// Parse a server entry from JSON text.
    pub fn from_json(path: &Path, json: &str) -> ConfigResult<Self> {
        serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load and validate a server entry from a file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_json(path, &content)?;
        if config.name.is_empty() {
            if let Some(stem) = path.file_stem() {
                config.name = stem.to_string_lossy().into_owned();
            }
        }

        let problems = config.problems();
        if !problems.is_empty() {
            let path_str = path.display().to_string();
            for problem in &problems {
                log_event_with_fields(
                    Event::ConfigInvalid,
                    &[("path", &path_str), ("problem", problem)],
                );
            }
            return Err(ConfigError::Invalid {
                path: path.to_path_buf(),
                problems,
            });
        }

        log_event_with_fields(
            Event::ConfigLoaded,
            &[("path", &path.display().to_string()), ("server", &config.name)],
        );
        Ok(config)
    }

    /// Load `<dir>/<name>.json`.
    pub fn load_named(dir: &Path, name: &str) -> ConfigResult<Self> {
        Self::load(&Self::path_for(dir, name))
    }

    pub fn path_for(dir: &Path, name: &str) -> PathBuf {
        dir.join(format!("{}.json", name))
    }

    /// Every reason this entry cannot be used, empty when valid
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.host.trim().is_empty() {
            problems.push("host is empty".to_string());
        }
        if self.user.trim().is_empty() {
            problems.push("user is empty".to_string());
        }
        if self.port == 0 {
            problems.push("port must be non-zero".to_string());
        }
        if let Some(ref file) = self.extra_def_file {
            if !file.is_file() {
                problems.push(format!("extra_def_file {} does not exist", file.display()));
            }
        }
        if self.rep_user.is_some() != self.rep_password.is_some() {
            problems.push("rep_user and rep_password must be set together".to_string());
        }

        problems
    }

    pub fn to_params(&self) -> ConnectionParams {
        let mut params = ConnectionParams::new(&self.name, &self.host, &self.user);
        params.port = self.port;
        params.password = self.password.clone();
        params.defaults_extra_file = self.extra_def_file.clone();
        params.replication = match (&self.rep_user, &self.rep_password) {
            (Some(user), Some(password)) => Some(ReplicationCredentials {
                user: user.clone(),
                password: password.clone(),
            }),
            _ => None,
        };
        params
    }
}

//! Running statements through the external `mysql` client
//!
//! The client runs in batch mode: one header row, tab-separated fields,
//! backslash escapes for tab/newline/backslash/NUL, and `NULL` for SQL NULL.

use std::path::PathBuf;
use std::process::Command;

use super::errors::{ServerError, ServerResult};
use super::params::ConnectionParams;
use super::status::Row;

/// Rows returned by one statement
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ResultSet {
    /// Decode `mysql --batch` output.
    pub fn from_batch_output(output: &str) -> Self {
        let mut lines = output.lines().filter(|l| !l.is_empty());

        let columns = match lines.next() {
            Some(header) => header.split('\t').map(unescape).collect(),
            None => return Self::default(),
        };

        let rows = lines
            .map(|line| line.split('\t').map(unescape).collect())
            .collect();

        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows keyed by column name
    pub fn row_maps(&self) -> Vec<Row> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }

    /// First row keyed by column name
    pub fn first_row(&self) -> Option<Row> {
        self.row_maps().into_iter().next()
    }

    /// Two-column `name, value` rows (e.g. `SHOW VARIABLES`) as a map
    pub fn pairs(&self) -> Row {
        self.rows
            .iter()
            .filter_map(|row| match row.as_slice() {
                [name, value, ..] => Some((name.clone(), value.clone())),
                _ => None,
            })
            .collect()
    }
}

fn unescape(field: &str) -> String {
    if !field.contains('\\') {
        return field.to_string();
    }

    let mut out = String::with_capacity(field.len());
    let mut chars = field.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Executes SQL against a server and returns its rows
pub trait QueryRunner {
    fn query(&self, params: &ConnectionParams, sql: &str) -> ServerResult<ResultSet>;
}

/// Production runner invoking the `mysql` command-line client
#[derive(Debug, Clone)]
pub struct MysqlClient {
    program: PathBuf,
}

impl MysqlClient {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for MysqlClient {
    fn default() -> Self {
        Self::new("mysql")
    }
}

impl QueryRunner for MysqlClient {
    fn query(&self, params: &ConnectionParams, sql: &str) -> ServerResult<ResultSet> {
        let output = Command::new(&self.program)
            .args(params.client_args())
            .arg("--batch")
            .arg("--execute")
            .arg(sql)
            .output()
            .map_err(|e| ServerError::ClientUnavailable {
                program: self.program.display().to_string(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ServerError::QueryFailed {
                server: params.name.clone(),
                message: if stderr.is_empty() {
                    format!("client exited with {}", output.status)
                } else {
                    stderr
                },
            });
        }

        let stdout = String::from_utf8(output.stdout).map_err(|e| ServerError::MalformedResult {
            server: params.name.clone(),
            message: format!("client output is not UTF-8: {}", e),
        })?;

        Ok(ResultSet::from_batch_output(&stdout))
    }
}

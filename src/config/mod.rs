//! Server connection configuration
//!
//! Each server is described by one JSON file, `<config-dir>/<name>.json`.
//! An entry is rejected with every problem listed before any server is
//! contacted.

mod errors;
mod server;

pub use errors::{ConfigError, ConfigResult};
pub use server::ServerConfig;

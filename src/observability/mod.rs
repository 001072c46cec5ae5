//! Observability for dbclone
//!
//! - Structured logging (JSON lines)
//! - Typed lifecycle events
//! - Begin/complete scopes with timing
//!
//! Observability is read-only: nothing here affects the clone decision
//! procedure, and a failed log write never fails a run.
//!
//! ```ignore
//! use dbclone::observability::{log_event_with_fields, Event, Logger};
//!
//! log_event_with_fields(Event::ServerConnected, &[("server", "db1")]);
//! Logger::warn("REPLICA_READ_LAG", &[("replica", "db2")]);
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::{ObservationScope, Timer};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event_severity(event), event.as_str(), fields);
}

/// Hard failures go to stderr at ERROR, everything else at INFO
fn event_severity(event: Event) -> Severity {
    if event.is_fatal() {
        Severity::Error
    } else {
        Severity::Info
    }
}

/// Log a lifecycle event at WARN level
pub fn warn_event(event: Event, fields: &[(&str, &str)]) {
    Logger::warn(event.as_str(), fields);
}

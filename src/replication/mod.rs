//! Replication Subsystem
//!
//! Decides whether a clone may become a replica and wires it up:
//! - Requirement tables per role, versioned at 8.0.26
//! - Validation of live server variables against those tables
//! - Dump coordinate flag selection and link stop/clear/configure/start
//! - Bounded wait for replica threads
//! - Advisory health verification
//!
//! Every hard check happens before the dump/load transfer. Nothing after
//! the transfer can fail a run except a statement that changes the link.

mod configurator;
mod errors;
mod requirements;
mod validator;
mod verifier;
mod wait;

pub use configurator::{
    configure_link, coordinate_arg, dump_data_flag, prepare, start_replication,
    stop_and_clear_existing_link, suppress_gtid_purged, CoordinateMode, LinkAction,
    ReplicationPlan, Requirements,
};
pub use errors::{ReplicationError, ReplicationErrorKind, ReplicationResult};
pub use requirements::{requirements_for, Enforcement, Requirement, RequirementSet, Revision};
pub use validator::{validate, Diagnostic, DiagnosticSeverity, ValidationResult};
pub use verifier::{log_report, verify, Finding, VerificationReport};
pub use wait::{wait_for_replica_threads, WaitOutcome, WaitPolicy};

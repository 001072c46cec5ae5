//! Live configuration against a requirement set
//!
//! - Missing variable: error
//! - Wrong value on a Required entry: error
//! - Wrong value on an Advisory entry: warning, validation still passes
//!
//! Validation reads nothing from and writes nothing to a server.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::observability::{log_event_with_fields, warn_event, Event};
use crate::server::ServerRole;

use super::requirements::{Enforcement, RequirementSet};

/// Severity of one diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticSeverity {
    Warning,
    Error,
}

/// One mismatched or missing variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub role: ServerRole,
    pub severity: DiagnosticSeverity,
    pub variable: String,
    pub expected: String,
    /// `None` when the server does not report the variable at all
    pub actual: Option<String>,
}

impl Diagnostic {
    pub fn missing(role: ServerRole, variable: &str, expected: &str) -> Self {
        Self {
            role,
            severity: DiagnosticSeverity::Error,
            variable: variable.to_string(),
            expected: expected.to_string(),
            actual: None,
        }
    }

    pub fn mismatch(
        role: ServerRole,
        severity: DiagnosticSeverity,
        variable: &str,
        expected: &str,
        actual: &str,
    ) -> Self {
        Self {
            role,
            severity,
            variable: variable.to_string(),
            expected: expected.to_string(),
            actual: Some(actual.to_string()),
        }
    }

    pub fn is_warning(&self) -> bool {
        self.severity == DiagnosticSeverity::Warning
    }

    /// Emit as a structured log line
    pub fn log(&self) {
        let fields = [
            ("role", self.role.as_str()),
            ("variable", self.variable.as_str()),
            ("expected", self.expected.as_str()),
            ("actual", self.actual.as_deref().unwrap_or("<missing>")),
        ];
        if self.is_warning() {
            warn_event(Event::RequirementWarning, &fields);
        } else {
            log_event_with_fields(Event::RequirementViolation, &fields);
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.severity, &self.actual) {
            (_, None) => write!(
                f,
                "Error: {} is missing option {} (expected {})",
                self.role, self.variable, self.expected
            ),
            (DiagnosticSeverity::Warning, Some(actual)) => write!(
                f,
                "Warning: {} variable not set for {} (expected {}, found {})",
                self.variable, self.role, self.expected, actual
            ),
            (DiagnosticSeverity::Error, Some(actual)) => write!(
                f,
                "Error: {} variable not set correctly on {} (expected {}, found {})",
                self.variable, self.role, self.expected, actual
            ),
        }
    }
}

/// Outcome of checking one role
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub passed: bool,
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_warning())
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| !d.is_warning())
    }
}

/// Compare `live` variable values against `required`.
pub fn validate(live: &BTreeMap<String, String>, required: &RequirementSet) -> ValidationResult {
    let role = required.role();
    let mut diagnostics = Vec::new();

    for requirement in required.iter() {
        match live.get(requirement.name) {
            None => diagnostics.push(Diagnostic::missing(
                role,
                requirement.name,
                requirement.value,
            )),
            Some(actual) if actual != requirement.value => {
                let severity = match requirement.enforcement {
                    Enforcement::Required => DiagnosticSeverity::Error,
                    Enforcement::Advisory => DiagnosticSeverity::Warning,
                };
                diagnostics.push(Diagnostic::mismatch(
                    role,
                    severity,
                    requirement.name,
                    requirement.value,
                    actual,
                ));
            }
            Some(_) => {}
        }
    }

    let passed = diagnostics.iter().all(Diagnostic::is_warning);
    ValidationResult {
        passed,
        diagnostics,
    }
}

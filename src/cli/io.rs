//! JSON summary output
//!
//! One JSON object on stdout per run, success or failure.

use std::io::{self, Write};

use serde_json::Value;

use super::errors::CliResult;

/// Write a success summary to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });
    write_line(&response)
}

/// Write a failure summary to stdout
pub fn write_error(code: &str, message: &str, details: &[String]) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message,
        "details": details,
    });
    write_line(&response)
}

fn write_line(value: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}

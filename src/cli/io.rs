//! JSON I/O handling for CLI
//!
//! - Input: one JSON document via stdin
//! - Output: one JSON document per line via stdout

use std::io::{self, Read, Write};

use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Parse a request body; blank input means no body
pub fn parse_request(input: &str) -> CliResult<Value> {
    if input.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(input)?)
}

/// Read a JSON request from stdin
pub fn read_request() -> CliResult<Value> {
    let mut input = String::new();
    io::stdin()
        .lock()
        .read_to_string(&mut input)
        .map_err(|e| CliError::io_error(format!("Failed to read stdin: {}", e)))?;
    parse_request(&input)
}

/// Write a JSON value to stdout on one line
pub fn write_json(value: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

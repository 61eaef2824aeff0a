//! CLI module for the librarian
//!
//! Provides command-line interface for:
//! - init: Create the library root
//! - serve: Serve the methods over HTTP
//! - call: One-shot request execution
//! - methods: List the method names

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{boot, call, init, load_config, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{parse_request, read_request, write_json};

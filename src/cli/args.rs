//! CLI argument definitions using clap
//!
//! Commands:
//! - librarian init
//! - librarian serve [--host <host>] [--port <port>]
//! - librarian call <method> [<json>]
//! - librarian methods

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Librarian - a namespaced file and archive store
#[derive(Parser, Debug)]
#[command(name = "librarian")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (defaults apply when omitted)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Library root, overriding the configuration file
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the library root if it does not exist
    Init,

    /// Serve the librarian methods over HTTP
    Serve {
        /// Host to bind to, overriding the configuration file
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to, overriding the configuration file
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run a single request and print the response
    Call {
        /// Method name, e.g. save or list_tarball
        method: String,

        /// JSON request body; read from stdin when omitted
        body: Option<String>,
    },

    /// List the method names
    Methods,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

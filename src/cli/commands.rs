//! CLI command implementations
//!
//! Every command loads the configuration, installs logging and creates the
//! library root before doing anything else. Failing to create the root is
//! fatal.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::config::LibrarianConfig;
use crate::http_server::LibrarianServer;
use crate::observability::init_tracing;
use crate::service::{DispatchError, LibrarianService, METHODS};
use crate::store::{LocalLibrary, TypeRegistry};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{parse_request, read_request, write_json};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cli: Cli) -> CliResult<()> {
    let config = load_config(cli.config, cli.root)?;
    init_tracing(&config.log_level)?;

    match cli.command {
        Command::Init => init(&config),
        Command::Serve { host, port } => serve(config, host, port),
        Command::Call { method, body } => call(&config, &method, body.as_deref()),
        Command::Methods => write_json(&json!(METHODS)),
    }
}

/// Load the configuration file (or defaults) and apply the `--root` override
pub fn load_config(path: Option<PathBuf>, root: Option<PathBuf>) -> CliResult<LibrarianConfig> {
    let mut config = LibrarianConfig::load_or_default(path.as_deref())?;
    if let Some(root) = root {
        config.root = root.display().to_string();
    }
    Ok(config)
}

/// Open the library, creating its root if needed
pub fn boot(config: &LibrarianConfig) -> CliResult<LocalLibrary> {
    let root = config.root_path();
    let library = LocalLibrary::open(&root)
        .map_err(|e| CliError::boot_failed(format!("Cannot use library root: {}", e)))?;
    info!(root = %library.root().display(), "librarian working directory");
    Ok(library)
}

/// Create the library root
pub fn init(config: &LibrarianConfig) -> CliResult<()> {
    let library = boot(config)?;
    write_json(&json!({ "root": library.root().display().to_string() }))
}

/// Serve the method table over HTTP until interrupted
pub fn serve(mut config: LibrarianConfig, host: Option<String>, port: Option<u16>) -> CliResult<()> {
    config.http.override_with(host, port);

    let service = Arc::new(LibrarianService::new(boot(&config)?));
    let server = LibrarianServer::new(config.http.clone(), service);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Run one request in-process and print its response
pub fn call(config: &LibrarianConfig, method: &str, body: Option<&str>) -> CliResult<()> {
    let body = match body {
        Some(body) => parse_request(body)?,
        None => read_request()?,
    };

    let service = LibrarianService::new(boot(config)?);
    let response = service.dispatch(method, body).map_err(|e| match e {
        DispatchError::UnknownMethod(method) => CliError::unknown_method(&method),
    })?;
    write_json(&response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::errors::CliErrorCode;
    use tempfile::TempDir;

    #[test]
    fn test_root_override() {
        let config = load_config(None, Some(PathBuf::from("/srv/library"))).unwrap();
        assert_eq!(config.root_path(), PathBuf::from("/srv/library"));
    }

    #[test]
    fn test_boot_creates_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("library");
        let config = load_config(None, Some(root.clone())).unwrap();

        boot(&config).unwrap();
        assert!(root.is_dir());
    }

    #[test]
    fn test_boot_fails_on_unusable_root() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let config = load_config(None, Some(blocker.join("library"))).unwrap();

        let err = boot(&config).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::BootFailed);
    }

    #[test]
    fn test_call_unknown_method() {
        let temp = TempDir::new().unwrap();
        let config = load_config(None, Some(temp.path().to_path_buf())).unwrap();

        let err = call(&config, "rename", Some("{}")).unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::UnknownMethod);
    }
}

//! Librarian configuration
//!
//! Loaded from a JSON file; every field is optional:
//!
//! ```json
//! {
//!   "root": "~/.costar/",
//!   "log_level": "info",
//!   "http": { "host": "127.0.0.1", "port": 7474 }
//! }
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http_server::HttpServerConfig;

pub const DEFAULT_ROOT: &str = "~/.costar/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibrarianConfig {
    /// Library root; a leading `~` expands to `$HOME`
    #[serde(default = "default_root")]
    pub root: String,

    /// Fallback filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub http: HttpServerConfig,
}

fn default_root() -> String {
    DEFAULT_ROOT.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LibrarianConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            log_level: default_log_level(),
            http: HttpServerConfig::default(),
        }
    }
}

impl LibrarianConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let config: LibrarianConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.root.trim().is_empty() {
            return Err(ConfigError::Invalid("root must not be empty".into()));
        }
        if self.http.port == 0 {
            return Err(ConfigError::Invalid("http.port must be > 0".into()));
        }
        Ok(())
    }

    /// Root directory with `~` expanded
    pub fn root_path(&self) -> PathBuf {
        expand_home(&self.root, env::var_os("HOME").map(PathBuf::from))
    }
}

fn expand_home(path: &str, home: Option<PathBuf>) -> PathBuf {
    match (path.strip_prefix('~'), home) {
        (Some(""), Some(home)) => home,
        (Some(rest), Some(home)) if rest.starts_with('/') => home.join(&rest[1..]),
        _ => PathBuf::from(path),
    }
}

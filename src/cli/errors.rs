//! CLI-specific error types
//!
//! All CLI errors end the process with a non-zero exit code.

use std::fmt;
use std::io;

use crate::config::ConfigError;
use crate::observability::ObservabilityError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// Library root could not be created
    BootFailed,
    /// No such service method
    UnknownMethod,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "LIBRARIAN_CLI_CONFIG_ERROR",
            Self::IoError => "LIBRARIAN_CLI_IO_ERROR",
            Self::BootFailed => "LIBRARIAN_CLI_BOOT_FAILED",
            Self::UnknownMethod => "LIBRARIAN_CLI_UNKNOWN_METHOD",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Boot failed
    pub fn boot_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BootFailed, msg)
    }

    pub fn unknown_method(method: &str) -> Self {
        Self::new(
            CliErrorCode::UnknownMethod,
            format!("Unknown method '{}'. Run 'librarian methods' for the list.", method),
        )
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<ObservabilityError> for CliError {
    fn from(e: ObservabilityError) -> Self {
        Self::config_error(e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code() {
        let err = CliError::boot_failed("root is read-only");
        assert_eq!(err.to_string(), "LIBRARIAN_CLI_BOOT_FAILED: root is read-only");
        assert_eq!(err.code(), &CliErrorCode::BootFailed);
    }

    #[test]
    fn test_from_config_error() {
        let err: CliError = ConfigError::Invalid("root must not be empty".into()).into();
        assert_eq!(err.code_str(), "LIBRARIAN_CLI_CONFIG_ERROR");
        assert!(err.message().contains("root must not be empty"));
    }
}

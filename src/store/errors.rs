//! # Library Errors

use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for library operations
pub type LibrarianResult<T> = Result<T, LibrarianError>;

/// Error kinds reported on the wire in a response status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NoError,
    /// No type was given
    TypeMissing,
    /// The type directory does not exist
    NoSuchType,
    /// The record or listing target does not exist
    FileMissing,
    /// The archive exists but has no member with the requested name
    EntryNotFound,
    /// A type, id or entry name would escape its directory
    InvalidName,
    /// A params record could not be parsed
    InvalidParams,
    /// The request body could not be decoded
    InvalidRequest,
    /// Any other filesystem failure
    IoFailure,
}

impl ErrorKind {
    /// Returns the wire code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NoError => "NO_ERROR",
            ErrorKind::TypeMissing => "TYPE_MISSING",
            ErrorKind::NoSuchType => "NO_SUCH_TYPE",
            ErrorKind::FileMissing => "FILE_MISSING",
            ErrorKind::EntryNotFound => "ENTRY_NOT_FOUND",
            ErrorKind::InvalidName => "INVALID_NAME",
            ErrorKind::InvalidParams => "INVALID_PARAMS",
            ErrorKind::InvalidRequest => "INVALID_REQUEST",
            ErrorKind::IoFailure => "IO_FAILURE",
        }
    }
}

impl Default for ErrorKind {
    fn default() -> Self {
        Self::NoError
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Library errors
#[derive(Debug, Error)]
pub enum LibrarianError {
    #[error("No type provided!")]
    TypeMissing,

    #[error("Type {0} does not exist!")]
    NoSuchType(String),

    #[error("File {id} does not exist as a member of type {type_name}!")]
    FileMissing { type_name: String, id: String },

    #[error("Could not find directory '{0}'")]
    DirectoryMissing(String),

    #[error("Archive {id}.tar does not exist as a member of type {type_name}!")]
    ArchiveMissing { type_name: String, id: String },

    #[error("Entry {entry} not found in archive {id}.tar of type {type_name}")]
    EntryNotFound {
        type_name: String,
        id: String,
        entry: String,
    },

    #[error("Invalid {what} name: '{name}'")]
    InvalidName { what: &'static str, name: String },

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl LibrarianError {
    /// I/O failure with a description of what was being attempted
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn invalid_name(what: &'static str, name: &str) -> Self {
        Self::InvalidName {
            what,
            name: name.to_string(),
        }
    }

    /// Wire kind for this error
    ///
    /// A missing archive reports `TYPE_MISSING`, which is what archive
    /// clients have always matched on.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LibrarianError::TypeMissing => ErrorKind::TypeMissing,
            LibrarianError::NoSuchType(_) => ErrorKind::NoSuchType,
            LibrarianError::FileMissing { .. } => ErrorKind::FileMissing,
            LibrarianError::DirectoryMissing(_) => ErrorKind::FileMissing,
            LibrarianError::ArchiveMissing { .. } => ErrorKind::TypeMissing,
            LibrarianError::EntryNotFound { .. } => ErrorKind::EntryNotFound,
            LibrarianError::InvalidName { .. } => ErrorKind::InvalidName,
            LibrarianError::InvalidParams(_) => ErrorKind::InvalidParams,
            LibrarianError::Io { .. } => ErrorKind::IoFailure,
        }
    }
}

//! # Library capability traits
//!
//! The service layer depends only on these traits, never on the filesystem
//! implementation behind them.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::LibrarianResult;

/// How `save` treats an existing record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveMode {
    /// Truncate and replace
    Overwrite,
    /// Append to the end, creating the record if needed
    Append,
}

impl Default for SaveMode {
    fn default() -> Self {
        Self::Overwrite
    }
}

/// One named member of an archive record
#[derive(Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub data: Vec<u8>,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

impl fmt::Debug for ArchiveEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveEntry")
            .field("name", &self.name)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Creation and lookup of top-level types
///
/// The only component allowed to create a namespace under the root.
pub trait TypeRegistry: Send + Sync + fmt::Debug {
    /// The library root
    fn root(&self) -> &Path;

    /// Create the root directory if it does not exist
    fn root_init(&self) -> LibrarianResult<()>;

    /// Create a type directory; an existing type is not an error
    fn add_type(&self, type_name: &str) -> LibrarianResult<()>;

    /// Path of an existing type directory
    fn resolve_type_path(&self, type_name: &str) -> LibrarianResult<PathBuf>;

    /// Path a flat record of an existing type lives at. The record itself
    /// need not exist.
    fn resolve_record_path(&self, type_name: &str, id: &str) -> LibrarianResult<PathBuf>;
}

/// Flat records
pub trait RecordStore: Send + Sync + fmt::Debug {
    fn save(&self, type_name: &str, id: &str, data: &[u8], mode: SaveMode) -> LibrarianResult<()>;

    fn load(&self, type_name: &str, id: &str) -> LibrarianResult<Vec<u8>>;

    fn delete(&self, type_name: &str, id: &str) -> LibrarianResult<()>;

    /// Entry names under a type, or the type names when `type_name` is empty.
    /// Order is whatever the filesystem returns.
    fn list(&self, type_name: &str) -> LibrarianResult<Vec<String>>;
}

/// Archive records
pub trait ArchiveStore: Send + Sync + fmt::Debug {
    /// Replace the archive with exactly `entries`, in order
    fn save_tarball(&self, type_name: &str, id: &str, entries: &[ArchiveEntry])
        -> LibrarianResult<()>;

    /// Member names in archive order, duplicates included
    fn list_tarball(&self, type_name: &str, id: &str) -> LibrarianResult<Vec<String>>;

    fn load_tarball(&self, type_name: &str, id: &str, entry: &str) -> LibrarianResult<Vec<u8>>;
}

/// Everything the service needs from a backend
pub trait Library: TypeRegistry + RecordStore + ArchiveStore {}

impl<T: TypeRegistry + RecordStore + ArchiveStore> Library for T {}

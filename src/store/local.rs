//! # Local Filesystem Library

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::errors::{LibrarianError, LibrarianResult};
use super::locks::{RecordGuard, RecordLocks};
use super::paths;
use super::traits::TypeRegistry;

/// Library backed by a directory tree
///
/// The filesystem is the only state. The struct holds the root path and the
/// writer locks, nothing else.
#[derive(Debug)]
pub struct LocalLibrary {
    root: PathBuf,
    locks: RecordLocks,
}

impl LocalLibrary {
    /// Create a library over `root`. Call `root_init` before serving.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: RecordLocks::new(),
        }
    }

    /// Create a library and its root directory
    pub fn open(root: impl Into<PathBuf>) -> LibrarianResult<Self> {
        let library = Self::new(root);
        library.root_init()?;
        Ok(library)
    }

    pub(crate) fn lock_record(&self, type_name: &str, id: &str) -> RecordGuard<'_> {
        self.locks.acquire(type_name, id)
    }

    #[cfg(test)]
    pub(crate) fn is_locked(&self, type_name: &str, id: &str) -> bool {
        self.locks.is_held(type_name, id)
    }
}

impl TypeRegistry for LocalLibrary {
    fn root(&self) -> &Path {
        &self.root
    }

    fn root_init(&self) -> LibrarianResult<()> {
        if self.root.is_dir() {
            return Ok(());
        }
        fs::create_dir_all(&self.root).map_err(|e| {
            LibrarianError::io(
                format!("Failed to create library root: {}", self.root.display()),
                e,
            )
        })?;
        info!(root = %self.root.display(), "created library root");
        Ok(())
    }

    fn add_type(&self, type_name: &str) -> LibrarianResult<()> {
        paths::check_type(type_name)?;
        let dir = paths::type_root(&self.root, type_name);

        match fs::create_dir(&dir) {
            Ok(()) => {
                debug!(type_name, "created type");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
            Err(e) => Err(LibrarianError::io(
                format!("Failed to create type directory: {}", dir.display()),
                e,
            )),
        }
    }

    fn resolve_type_path(&self, type_name: &str) -> LibrarianResult<PathBuf> {
        paths::require_type(&self.root, type_name)
    }

    fn resolve_record_path(&self, type_name: &str, id: &str) -> LibrarianResult<PathBuf> {
        paths::require_flat_record_type(&self.root, type_name, id)?;
        Ok(paths::record_path(&self.root, type_name, id))
    }
}

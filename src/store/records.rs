//! Flat record storage
//!
//! A record is the file `<root>/<type>/<id>`. Preconditions are checked in a
//! fixed order: type given, type valid, type directory present, id valid, then
//! (for load and delete) record present.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};

use tracing::debug;

use super::errors::{LibrarianError, LibrarianResult};
use super::local::LocalLibrary;
use super::paths;
use super::traits::{RecordStore, SaveMode, TypeRegistry};

impl RecordStore for LocalLibrary {
    fn save(&self, type_name: &str, id: &str, data: &[u8], mode: SaveMode) -> LibrarianResult<()> {
        let path = self.resolve_record_path(type_name, id)?;
        let _guard = self.lock_record(type_name, id);

        let mut options = OpenOptions::new();
        options.create(true);
        match mode {
            SaveMode::Overwrite => options.write(true).truncate(true),
            SaveMode::Append => options.append(true),
        };

        let mut file = options.open(&path).map_err(|e| {
            LibrarianError::io(format!("Failed to open record: {}", path.display()), e)
        })?;
        file.write_all(data).map_err(|e| {
            LibrarianError::io(format!("Failed to write record: {}", path.display()), e)
        })?;
        file.sync_all().map_err(|e| {
            LibrarianError::io(format!("Failed to fsync record: {}", path.display()), e)
        })?;

        debug!(type_name, id, bytes = data.len(), ?mode, "saved record");
        Ok(())
    }

    fn load(&self, type_name: &str, id: &str) -> LibrarianResult<Vec<u8>> {
        let path = self.resolve_record_path(type_name, id)?;
        if !path.is_file() {
            return Err(LibrarianError::FileMissing {
                type_name: type_name.to_string(),
                id: id.to_string(),
            });
        }

        fs::read(&path)
            .map_err(|e| LibrarianError::io(format!("Failed to read record: {}", path.display()), e))
    }

    fn delete(&self, type_name: &str, id: &str) -> LibrarianResult<()> {
        let path = self.resolve_record_path(type_name, id)?;
        let _guard = self.lock_record(type_name, id);

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(type_name, id, "deleted record");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(LibrarianError::FileMissing {
                type_name: type_name.to_string(),
                id: id.to_string(),
            }),
            Err(e) => Err(LibrarianError::io(
                format!("Failed to delete record: {}", path.display()),
                e,
            )),
        }
    }

    fn list(&self, type_name: &str) -> LibrarianResult<Vec<String>> {
        let dir = if type_name.is_empty() {
            self.root().to_path_buf()
        } else {
            paths::validate_name("type", type_name)?;
            paths::type_root(self.root(), type_name)
        };

        if !dir.is_dir() {
            return Err(LibrarianError::DirectoryMissing(dir.display().to_string()));
        }

        let read_dir = fs::read_dir(&dir).map_err(|e| {
            LibrarianError::io(format!("Failed to list directory: {}", dir.display()), e)
        })?;

        let mut names = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| {
                LibrarianError::io(format!("Failed to list directory: {}", dir.display()), e)
            })?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }
}

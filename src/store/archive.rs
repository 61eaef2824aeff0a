//! Archive record storage
//!
//! An archive record is an uncompressed tar file at `<root>/<type>/<id>.tar`.
//! It is always rewritten whole: the new archive is built next to the old one
//! as `.<id>.tar.partial`, fsynced, then renamed over it.

use std::fs::{self, File};
use std::io::{BufWriter, Read};
use std::path::{Component, Path, PathBuf};

use chrono::Utc;
use tar::{Archive, Builder, EntryType, Header};
use tracing::debug;

use super::errors::{LibrarianError, LibrarianResult};
use super::local::LocalLibrary;
use super::paths;
use super::traits::{ArchiveEntry, ArchiveStore, TypeRegistry};

const ENTRY_MODE: u32 = 0o644;

impl LocalLibrary {
    /// Validated path of an existing archive
    fn require_archive(&self, type_name: &str, id: &str) -> LibrarianResult<PathBuf> {
        paths::require_record_type(self.root(), type_name, id)?;
        let path = paths::archive_path(self.root(), type_name, id);
        if !path.is_file() {
            return Err(LibrarianError::ArchiveMissing {
                type_name: type_name.to_string(),
                id: id.to_string(),
            });
        }
        Ok(path)
    }
}

impl ArchiveStore for LocalLibrary {
    fn save_tarball(
        &self,
        type_name: &str,
        id: &str,
        entries: &[ArchiveEntry],
    ) -> LibrarianResult<()> {
        paths::require_record_type(self.root(), type_name, id)?;
        for entry in entries {
            validate_entry_name(&entry.name)?;
        }

        let _guard = self.lock_record(type_name, id);
        let path = paths::archive_path(self.root(), type_name, id);
        let partial = paths::partial_archive_path(self.root(), type_name, id);

        let written = write_tar_archive(&partial, entries).and_then(|()| {
            fs::rename(&partial, &path).map_err(|e| {
                LibrarianError::io(format!("Failed to replace archive: {}", path.display()), e)
            })
        });
        if written.is_err() {
            cleanup_partial_archive(&partial);
        }
        written?;
        fsync_dir(&paths::type_root(self.root(), type_name))?;

        debug!(type_name, id, entries = entries.len(), "saved archive");
        Ok(())
    }

    fn list_tarball(&self, type_name: &str, id: &str) -> LibrarianResult<Vec<String>> {
        let path = self.require_archive(type_name, id)?;
        let mut archive = open_archive(&path)?;

        let mut names = Vec::new();
        for entry in archive.entries().map_err(|e| read_error(&path, e))? {
            let entry = entry.map_err(|e| read_error(&path, e))?;
            let name = entry.path().map_err(|e| read_error(&path, e))?;
            names.push(name.to_string_lossy().into_owned());
        }
        Ok(names)
    }

    /// Contents of `entry`. With duplicate names the last member wins.
    fn load_tarball(&self, type_name: &str, id: &str, entry: &str) -> LibrarianResult<Vec<u8>> {
        let path = self.require_archive(type_name, id)?;
        let mut archive = open_archive(&path)?;

        let mut found = None;
        for member in archive.entries().map_err(|e| read_error(&path, e))? {
            let mut member = member.map_err(|e| read_error(&path, e))?;
            let is_match = &*member.path_bytes() == entry.as_bytes();
            if is_match {
                let mut data = Vec::with_capacity(member.size() as usize);
                member
                    .read_to_end(&mut data)
                    .map_err(|e| read_error(&path, e))?;
                found = Some(data);
            }
        }

        found.ok_or_else(|| LibrarianError::EntryNotFound {
            type_name: type_name.to_string(),
            id: id.to_string(),
            entry: entry.to_string(),
        })
    }
}

/// Entry names are relative paths made only of normal components, already
/// in the form tar stores them (no `.` segments, repeated or trailing `/`)
fn validate_entry_name(name: &str) -> LibrarianResult<()> {
    let mut segments = Vec::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(segment) => segments.push(segment.to_string_lossy()),
            _ => return Err(LibrarianError::invalid_name("entry", name)),
        }
    }
    let valid = !name.contains('\0') && !segments.is_empty() && segments.join("/") == name;
    if !valid {
        return Err(LibrarianError::invalid_name("entry", name));
    }
    Ok(())
}

/// Write `entries` as a fresh tar file at `output_path`
///
/// Each member is a regular file stamped with the current time.
fn write_tar_archive(output_path: &Path, entries: &[ArchiveEntry]) -> LibrarianResult<()> {
    let file = File::create(output_path).map_err(|e| {
        LibrarianError::io(
            format!("Failed to create archive file: {}", output_path.display()),
            e,
        )
    })?;

    let mut builder = Builder::new(BufWriter::new(file));
    let mtime = Utc::now().timestamp().max(0) as u64;

    for entry in entries {
        let mut header = Header::new_ustar();
        header.set_entry_type(EntryType::Regular);
        header.set_size(entry.data.len() as u64);
        header.set_mode(ENTRY_MODE);
        header.set_mtime(mtime);

        builder
            .append_data(&mut header, &entry.name, entry.data.as_slice())
            .map_err(|e| {
                LibrarianError::io(format!("Failed to add entry to archive: {}", entry.name), e)
            })?;
    }

    let writer = builder
        .into_inner()
        .map_err(|e| LibrarianError::io("Failed to finish archive", e))?;

    let file = writer
        .into_inner()
        .map_err(|e| LibrarianError::io("Failed to flush archive buffer", e.into_error()))?;

    file.sync_all().map_err(|e| {
        LibrarianError::io(
            format!("Failed to fsync archive: {}", output_path.display()),
            e,
        )
    })
}

fn open_archive(path: &Path) -> LibrarianResult<Archive<File>> {
    let file = File::open(path).map_err(|e| {
        LibrarianError::io(format!("Failed to open archive: {}", path.display()), e)
    })?;
    Ok(Archive::new(file))
}

fn read_error(path: &Path, e: std::io::Error) -> LibrarianError {
    LibrarianError::io(format!("Failed to read archive: {}", path.display()), e)
}

/// fsync a directory so a rename inside it is durable
fn fsync_dir(dir: &Path) -> LibrarianResult<()> {
    let handle = File::open(dir).map_err(|e| {
        LibrarianError::io(format!("Failed to open directory: {}", dir.display()), e)
    })?;
    handle.sync_all().map_err(|e| {
        LibrarianError::io(format!("Failed to fsync directory: {}", dir.display()), e)
    })
}

/// Delete a partial archive if it exists
fn cleanup_partial_archive(partial_path: &Path) {
    if partial_path.exists() {
        let _ = fs::remove_file(partial_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::traits::{RecordStore, SaveMode};
    use tempfile::TempDir;

    fn library_with_type(type_name: &str) -> (TempDir, LocalLibrary) {
        let temp = TempDir::new().unwrap();
        let library = LocalLibrary::open(temp.path()).unwrap();
        library.add_type(type_name).unwrap();
        (temp, library)
    }

    fn sample_entries() -> Vec<ArchiveEntry> {
        vec![
            ArchiveEntry::new("a.txt", &b"hello"[..]),
            ArchiveEntry::new("b.txt", &b"world"[..]),
        ]
    }

    #[test]
    fn test_archive_roundtrip() {
        let (_temp, library) = library_with_type("scenes");
        library
            .save_tarball("scenes", "kitchen", &sample_entries())
            .unwrap();

        assert_eq!(
            library.list_tarball("scenes", "kitchen").unwrap(),
            vec!["a.txt", "b.txt"]
        );
        assert_eq!(
            library.load_tarball("scenes", "kitchen", "a.txt").unwrap(),
            b"hello"
        );
        assert_eq!(
            library.load_tarball("scenes", "kitchen", "b.txt").unwrap(),
            b"world"
        );
    }

    #[test]
    fn test_archive_is_plain_tar() {
        let (temp, library) = library_with_type("scenes");
        let before = Utc::now().timestamp() as u64;
        library
            .save_tarball("scenes", "kitchen", &sample_entries())
            .unwrap();

        let file = File::open(temp.path().join("scenes").join("kitchen.tar")).unwrap();
        let mut archive = Archive::new(file);
        for entry in archive.entries().unwrap() {
            let entry = entry.unwrap();
            let header = entry.header();
            assert_eq!(header.entry_type(), EntryType::Regular);
            assert_eq!(header.size().unwrap(), 5);
            assert!(header.mtime().unwrap() >= before);
        }
    }

    #[test]
    fn test_save_replaces_whole_archive() {
        let (temp, library) = library_with_type("scenes");
        library
            .save_tarball("scenes", "kitchen", &sample_entries())
            .unwrap();
        library
            .save_tarball("scenes", "kitchen", &[ArchiveEntry::new("c.txt", &b"!"[..])])
            .unwrap();

        assert_eq!(library.list_tarball("scenes", "kitchen").unwrap(), vec!["c.txt"]);

        let mut names = library.list("scenes").unwrap();
        names.sort();
        assert_eq!(names, vec!["kitchen.tar"]);
        assert!(!temp.path().join("scenes").join(".kitchen.tar.partial").exists());
    }

    #[test]
    fn test_empty_archive() {
        let (_temp, library) = library_with_type("scenes");
        library.save_tarball("scenes", "empty", &[]).unwrap();
        assert!(library.list_tarball("scenes", "empty").unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_names_last_wins() {
        let (_temp, library) = library_with_type("scenes");
        let entries = vec![
            ArchiveEntry::new("a.txt", &b"first"[..]),
            ArchiveEntry::new("a.txt", &b"second"[..]),
        ];
        library.save_tarball("scenes", "dup", &entries).unwrap();

        assert_eq!(
            library.list_tarball("scenes", "dup").unwrap(),
            vec!["a.txt", "a.txt"]
        );
        assert_eq!(
            library.load_tarball("scenes", "dup", "a.txt").unwrap(),
            b"second"
        );
    }

    #[test]
    fn test_long_and_nested_names() {
        let (_temp, library) = library_with_type("scenes");
        let long_name = format!("meshes/{}.stl", "x".repeat(150));
        let entries = vec![ArchiveEntry::new(long_name.clone(), &b"solid"[..])];
        library.save_tarball("scenes", "meshes", &entries).unwrap();

        assert_eq!(
            library.list_tarball("scenes", "meshes").unwrap(),
            vec![long_name.clone()]
        );
        assert_eq!(
            library.load_tarball("scenes", "meshes", &long_name).unwrap(),
            b"solid"
        );
    }

    #[test]
    fn test_missing_archive() {
        let (_temp, library) = library_with_type("scenes");
        let err = library.list_tarball("scenes", "nope").unwrap_err();
        assert!(matches!(err, LibrarianError::ArchiveMissing { .. }));

        let err = library.load_tarball("scenes", "nope", "a.txt").unwrap_err();
        assert!(matches!(err, LibrarianError::ArchiveMissing { .. }));
    }

    #[test]
    fn test_entry_not_found() {
        let (_temp, library) = library_with_type("scenes");
        library
            .save_tarball("scenes", "kitchen", &sample_entries())
            .unwrap();

        let err = library
            .load_tarball("scenes", "kitchen", "c.txt")
            .unwrap_err();
        assert!(matches!(err, LibrarianError::EntryNotFound { entry, .. } if entry == "c.txt"));
    }

    #[test]
    fn test_archive_requires_type() {
        let (_temp, library) = library_with_type("scenes");
        assert!(matches!(
            library.save_tarball("", "kitchen", &sample_entries()),
            Err(LibrarianError::TypeMissing)
        ));
        assert!(matches!(
            library.save_tarball("robots", "kitchen", &sample_entries()),
            Err(LibrarianError::NoSuchType(_))
        ));
        assert!(matches!(
            library.list_tarball("robots", "kitchen"),
            Err(LibrarianError::NoSuchType(_))
        ));
    }

    #[test]
    fn test_invalid_entry_name_keeps_old_archive() {
        let (_temp, library) = library_with_type("scenes");
        library
            .save_tarball("scenes", "kitchen", &sample_entries())
            .unwrap();

        for bad in ["", "../escape", "/etc/passwd", "./a.txt", "a/../b"] {
            let err = library
                .save_tarball("scenes", "kitchen", &[ArchiveEntry::new(bad, &b"x"[..])])
                .unwrap_err();
            assert!(matches!(err, LibrarianError::InvalidName { .. }), "{:?}", bad);
        }

        assert_eq!(
            library.list_tarball("scenes", "kitchen").unwrap(),
            vec!["a.txt", "b.txt"]
        );
    }

    #[test]
    fn test_rejects_names_tar_would_rewrite() {
        let (_temp, library) = library_with_type("scenes");
        for bad in ["a/./b", "dir/", "c//d"] {
            let err = library
                .save_tarball("scenes", "kitchen", &[ArchiveEntry::new(bad, &b"x"[..])])
                .unwrap_err();
            assert!(matches!(err, LibrarianError::InvalidName { .. }), "{:?}", bad);
        }
        assert!(matches!(
            library.list_tarball("scenes", "kitchen"),
            Err(LibrarianError::ArchiveMissing { .. })
        ));
    }

    #[test]
    fn test_accepted_names_load_back_verbatim() {
        let (_temp, library) = library_with_type("scenes");
        let names = ["a/b", "c/d/e.txt", "..hidden", "f.tar"];
        let entries: Vec<_> = names
            .iter()
            .map(|name| ArchiveEntry::new(*name, name.as_bytes()))
            .collect();
        library.save_tarball("scenes", "kitchen", &entries).unwrap();

        assert_eq!(library.list_tarball("scenes", "kitchen").unwrap(), names);
        for name in names {
            assert_eq!(
                library.load_tarball("scenes", "kitchen", name).unwrap(),
                name.as_bytes()
            );
        }
    }

    #[test]
    fn test_flat_id_cannot_reach_archive_file() {
        let (temp, library) = library_with_type("scenes");
        library
            .save_tarball("scenes", "kitchen", &sample_entries())
            .unwrap();

        for id in ["kitchen.tar", ".kitchen.tar.partial"] {
            assert!(matches!(
                library.save("scenes", id, b"flat", SaveMode::Overwrite),
                Err(LibrarianError::InvalidName { .. })
            ));
            assert!(matches!(
                library.load("scenes", id),
                Err(LibrarianError::InvalidName { .. })
            ));
            assert!(matches!(
                library.delete("scenes", id),
                Err(LibrarianError::InvalidName { .. })
            ));
        }

        assert!(temp.path().join("scenes").join("kitchen.tar").is_file());
        assert_eq!(
            library.list_tarball("scenes", "kitchen").unwrap(),
            vec!["a.txt", "b.txt"]
        );
    }

    #[test]
    fn test_fsync_dir() {
        let temp = TempDir::new().unwrap();
        assert!(fsync_dir(temp.path()).is_ok());
        assert!(matches!(
            fsync_dir(&temp.path().join("missing")),
            Err(LibrarianError::Io { .. })
        ));
    }

    #[test]
    fn test_flat_and_archive_records_coexist() {
        let (_temp, library) = library_with_type("scenes");
        library
            .save("scenes", "kitchen", b"flat", SaveMode::Overwrite)
            .unwrap();
        library
            .save_tarball("scenes", "kitchen", &sample_entries())
            .unwrap();

        assert_eq!(library.load("scenes", "kitchen").unwrap(), b"flat");
        assert_eq!(
            library.load_tarball("scenes", "kitchen", "a.txt").unwrap(),
            b"hello"
        );

        library.delete("scenes", "kitchen").unwrap();
        assert!(library.list_tarball("scenes", "kitchen").is_ok());
    }

    #[test]
    fn test_cleanup_partial_archive() {
        let temp = TempDir::new().unwrap();
        let partial = temp.path().join(".x.tar.partial");
        fs::write(&partial, b"partial").unwrap();

        cleanup_partial_archive(&partial);
        assert!(!partial.exists());

        // Should not panic
        cleanup_partial_archive(&partial);
    }
}

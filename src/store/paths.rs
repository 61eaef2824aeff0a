//! Path resolution under the library root
//!
//! Layout:
//!
//! ```text
//! <root>/
//! ├── <type>/
//! │   ├── <id>          flat record
//! │   └── <id>.tar      archive record
//! ```
//!
//! Nothing here touches the filesystem except the two existence checks.

use std::path::{Path, PathBuf};

use super::errors::{LibrarianError, LibrarianResult};

/// Suffix distinguishing an archive record from a flat record with the same id
pub const ARCHIVE_SUFFIX: &str = ".tar";

/// Suffix of the scratch file an archive is built in before it replaces `<id>.tar`
pub const PARTIAL_SUFFIX: &str = ".partial";

/// Check that a type or id is a single path component
///
/// Rejects `.`, `..`, and anything containing a separator or NUL.
pub fn validate_name(what: &'static str, name: &str) -> LibrarianResult<()> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0'])
    {
        return Err(LibrarianError::invalid_name(what, name));
    }
    Ok(())
}

/// Check a flat record id
///
/// Ids ending in `.tar` or `.tar.partial` would name an archive file or its
/// scratch file, so flat records may not use them.
pub fn validate_flat_id(id: &str) -> LibrarianResult<()> {
    validate_name("id", id)?;
    let scratch = format!("{}{}", ARCHIVE_SUFFIX, PARTIAL_SUFFIX);
    if id.ends_with(ARCHIVE_SUFFIX) || id.ends_with(&scratch) {
        return Err(LibrarianError::invalid_name("id", id));
    }
    Ok(())
}

/// Check a type argument: empty means no type was given
pub fn check_type(type_name: &str) -> LibrarianResult<()> {
    if type_name.is_empty() {
        return Err(LibrarianError::TypeMissing);
    }
    validate_name("type", type_name)
}

/// `<root>/<type>`
pub fn type_root(root: &Path, type_name: &str) -> PathBuf {
    root.join(type_name)
}

/// `<root>/<type>/<id>`
pub fn record_path(root: &Path, type_name: &str, id: &str) -> PathBuf {
    type_root(root, type_name).join(id)
}

/// `<root>/<type>/<id>.tar`
pub fn archive_path(root: &Path, type_name: &str, id: &str) -> PathBuf {
    type_root(root, type_name).join(format!("{}{}", id, ARCHIVE_SUFFIX))
}

/// `<root>/<type>/.<id>.tar.partial`
pub fn partial_archive_path(root: &Path, type_name: &str, id: &str) -> PathBuf {
    type_root(root, type_name).join(format!(".{}{}{}", id, ARCHIVE_SUFFIX, PARTIAL_SUFFIX))
}

pub fn type_exists(root: &Path, type_name: &str) -> bool {
    type_root(root, type_name).is_dir()
}

pub fn record_exists(root: &Path, type_name: &str, id: &str) -> bool {
    record_path(root, type_name, id).is_file()
}

pub fn archive_exists(root: &Path, type_name: &str, id: &str) -> bool {
    archive_path(root, type_name, id).is_file()
}

/// Validate `type` and make sure its directory exists
///
/// `TypeMissing` is always reported before `NoSuchType`.
pub fn require_type(root: &Path, type_name: &str) -> LibrarianResult<PathBuf> {
    check_type(type_name)?;
    let dir = type_root(root, type_name);
    if !dir.is_dir() {
        return Err(LibrarianError::NoSuchType(type_name.to_string()));
    }
    Ok(dir)
}

/// Validate `(type, id)` and make sure the type directory exists
pub fn require_record_type(root: &Path, type_name: &str, id: &str) -> LibrarianResult<()> {
    require_type(root, type_name)?;
    validate_name("id", id)
}

/// Like `require_record_type`, also keeping the id clear of archive file names
pub fn require_flat_record_type(root: &Path, type_name: &str, id: &str) -> LibrarianResult<()> {
    require_type(root, type_name)?;
    validate_flat_id(id)
}

//! # Librarian Store
//!
//! Namespaced record storage under a single root directory.
//!
//! - Types are top-level directories, created only through `add_type`
//! - Flat records are files named by id inside a type directory
//! - Archive records are `<id>.tar` files in the same directory
//!
//! The filesystem is the only state; there is no in-memory index.

pub mod errors;
pub mod paths;
pub mod traits;
mod archive;
mod local;
mod locks;
mod records;

pub use errors::{ErrorKind, LibrarianError, LibrarianResult};
pub use local::LocalLibrary;
pub use locks::{RecordGuard, RecordLocks};
pub use traits::{ArchiveEntry, ArchiveStore, Library, RecordStore, SaveMode, TypeRegistry};

//! Per-record writer exclusion
//!
//! Writers to the same `(type, id)` are serialized for the duration of one
//! save, delete or archive rewrite. Flat and archive records with the same id
//! share a key. Readers never take a lock.

use std::collections::HashSet;
use std::sync::{Condvar, Mutex, MutexGuard};

type RecordKey = (String, String);

/// Set of records currently being written
#[derive(Debug, Default)]
pub struct RecordLocks {
    held: Mutex<HashSet<RecordKey>>,
    released: Condvar,
}

impl RecordLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until no other writer holds `(type, id)`, then take it
    ///
    /// The returned guard releases the record on drop, including on early
    /// returns and unwinding.
    pub fn acquire(&self, type_name: &str, id: &str) -> RecordGuard<'_> {
        let key = (type_name.to_string(), id.to_string());
        let mut held = self.lock_set();
        while held.contains(&key) {
            held = self
                .released
                .wait(held)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
        held.insert(key.clone());
        RecordGuard { locks: self, key }
    }

    /// Whether a writer currently holds `(type, id)`
    pub fn is_held(&self, type_name: &str, id: &str) -> bool {
        self.lock_set()
            .contains(&(type_name.to_string(), id.to_string()))
    }

    // The set is only mutated by insert/remove, so a poisoned guard is still consistent.
    fn lock_set(&self) -> MutexGuard<'_, HashSet<RecordKey>> {
        self.held
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Exclusive hold on one record
#[derive(Debug)]
pub struct RecordGuard<'a> {
    locks: &'a RecordLocks,
    key: RecordKey,
}

impl Drop for RecordGuard<'_> {
    fn drop(&mut self) {
        self.locks.lock_set().remove(&self.key);
        self.locks.released.notify_all();
    }
}

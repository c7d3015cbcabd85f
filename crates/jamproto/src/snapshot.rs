//! Collection snapshots and the before/after diff.
//!
//! The host never returns a handle from a creation call. The only way to
//! learn what a `create_*` call produced is to list the collection before
//! and after and compare ids. [`Snapshot`] freezes one such listing;
//! [`diff`] computes what appeared between two of them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::handle::{Handle, ObjectId};

/// An ordered listing of a host collection at one instant.
///
/// Entries carrying the invalid-id sentinel (phantom slots) are dropped at
/// capture time, so [`Snapshot::len`] counts *real* objects. The raw slot
/// count including phantoms is kept separately: a collection that grew only
/// by phantoms produced *something*, even if nothing identifiable.
/// Immutable once taken.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    entries: Vec<Handle>,
    raw_len: usize,
}

impl Snapshot {
    pub fn new(entries: impl IntoIterator<Item = Handle>) -> Self {
        let mut raw_len = 0;
        let entries = entries
            .into_iter()
            .inspect(|_| raw_len += 1)
            .filter(|h| h.id.is_valid())
            .collect();
        Self { entries, raw_len }
    }

    /// Number of valid (non-phantom) entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of slots the host listed, phantoms included.
    pub fn raw_len(&self) -> usize {
        self.raw_len
    }

    pub fn phantom_count(&self) -> usize {
        self.raw_len - self.entries.len()
    }

    pub fn contains_id(&self, id: ObjectId) -> bool {
        self.entries.iter().any(|h| h.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Handle> {
        self.entries.iter()
    }

    /// Entry whose display name contains `needle`, case-insensitively.
    pub fn find_by_name(&self, needle: &str) -> Option<&Handle> {
        let needle = needle.to_lowercase();
        self.entries
            .iter()
            .find(|h| h.name.to_lowercase().contains(&needle))
    }
}

impl FromIterator<Handle> for Snapshot {
    fn from_iter<T: IntoIterator<Item = Handle>>(iter: T) -> Self {
        Snapshot::new(iter)
    }
}

/// Handles present in `after` whose id does not appear in `before`.
///
/// Returned in `after`'s collection order. Sentinel-id entries can never
/// appear in the result because snapshots exclude them at capture. Pure and
/// total: empty inputs yield empty output.
pub fn diff(before: &Snapshot, after: &Snapshot) -> Vec<Handle> {
    let known: HashSet<ObjectId> = before.iter().map(|h| h.id).collect();
    after
        .iter()
        .filter(|h| !known.contains(&h.id))
        .cloned()
        .collect()
}

//! Tree Diff
//!
//! Walks two trees in lockstep by canonical name order. Entries with equal
//! digests are skipped without being read, so the cost follows the size of
//! the change rather than the size of the tree.

use crate::error::StorageError;
use crate::store::ObjectStore;
use crate::tree::builder::{join_path, read_tree};
use crate::tree::node::{EntryKind, TreeEntry};
use crate::types::Digest;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// How a path differs between the two sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

/// One changed path, `/`-separated from the compared root
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChangedPath {
    pub path: String,
    pub change: ChangeKind,
}

/// Per-kind counts of a diff result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
}

impl DiffSummary {
    pub fn from_changes(changes: &[ChangedPath]) -> Self {
        let mut summary = Self::default();
        for change in changes {
            match change.change {
                ChangeKind::Added => summary.added += 1,
                ChangeKind::Removed => summary.removed += 1,
                ChangeKind::Modified => summary.modified += 1,
            }
        }
        summary
    }

    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.removed == 0 && self.modified == 0
    }
}

/// Compares stored trees
pub struct DiffEngine<'a> {
    store: &'a dyn ObjectStore,
}

impl<'a> DiffEngine<'a> {
    pub fn new(store: &'a dyn ObjectStore) -> Self {
        Self { store }
    }

    /// Paths that differ between tree `a` and tree `b`, in depth-first canonical order.
    ///
    /// A Tree on one side and a Blob on the other is reported once as
    /// `Modified` under the shared name. Renames appear as a removal plus an
    /// addition.
    pub fn diff_trees(&self, a: &Digest, b: &Digest) -> Result<Vec<ChangedPath>, StorageError> {
        let mut changes = Vec::new();
        if a != b {
            self.diff_into(a, b, "", &mut changes)?;
        }
        debug!(
            from = %a.short(),
            to = %b.short(),
            changed = changes.len(),
            "Diffed trees"
        );
        Ok(changes)
    }

    fn diff_into(
        &self,
        a: &Digest,
        b: &Digest,
        prefix: &str,
        out: &mut Vec<ChangedPath>,
    ) -> Result<(), StorageError> {
        let left = read_tree(self.store, a)?;
        let right = read_tree(self.store, b)?;
        let (left, right) = (left.entries(), right.entries());

        let (mut i, mut j) = (0, 0);
        while i < left.len() || j < right.len() {
            let order = match (left.get(i), right.get(j)) {
                (Some(l), Some(r)) => l.name.as_bytes().cmp(r.name.as_bytes()),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => break,
            };

            match order {
                Ordering::Less => {
                    self.emit_all(&left[i], prefix, ChangeKind::Removed, out)?;
                    i += 1;
                }
                Ordering::Greater => {
                    self.emit_all(&right[j], prefix, ChangeKind::Added, out)?;
                    j += 1;
                }
                Ordering::Equal => {
                    let (l, r) = (&left[i], &right[j]);
                    if l.digest != r.digest {
                        let path = join_path(prefix, &l.name);
                        if l.kind == EntryKind::Tree && r.kind == EntryKind::Tree {
                            self.diff_into(&l.digest, &r.digest, &path, out)?;
                        } else {
                            out.push(ChangedPath {
                                path,
                                change: ChangeKind::Modified,
                            });
                        }
                    }
                    i += 1;
                    j += 1;
                }
            }
        }
        Ok(())
    }

    /// Report an entry present on one side only; trees expand to every file beneath them.
    fn emit_all(
        &self,
        entry: &TreeEntry,
        prefix: &str,
        change: ChangeKind,
        out: &mut Vec<ChangedPath>,
    ) -> Result<(), StorageError> {
        let path = join_path(prefix, &entry.name);
        match entry.kind {
            EntryKind::Blob => out.push(ChangedPath { path, change }),
            EntryKind::Tree => {
                for child in read_tree(self.store, &entry.digest)?.entries() {
                    self.emit_all(child, &path, change, out)?;
                }
            }
        }
        Ok(())
    }
}

//! Snapshot History
//!
//! An append-only chain of snapshots. Each snapshot names its parent by id, so
//! altering any ancestor changes every descendant's id. Commits are serialized
//! through a single writer lock; reads take no commit lock.

pub mod log;
pub mod refs;
pub mod snapshot;

pub use log::{HistoryLog, MemoryHistoryLog, SledHistoryLog};
pub use refs::RefSpec;
pub use snapshot::Snapshot;

use crate::error::StorageError;
use crate::store::ObjectStore;
use crate::tree::builder::read_tree;
use crate::tree::hasher::compute_digest;
use crate::types::{Digest, ObjectKind, SnapshotId};
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

/// Snapshot history over an object store
pub struct History {
    store: Arc<dyn ObjectStore>,
    log: Box<dyn HistoryLog>,
    author: String,
    commit_lock: Mutex<()>,
}

impl History {
    pub fn new(store: Arc<dyn ObjectStore>, log: Box<dyn HistoryLog>, author: impl Into<String>) -> Self {
        Self {
            store,
            log,
            author: author.into(),
            commit_lock: Mutex::new(()),
        }
    }

    /// Record a snapshot of `root` on top of `parent`.
    ///
    /// `root` must be a stored tree and `parent` must be the current HEAD
    /// (`None` only on an empty history).
    pub fn commit(
        &self,
        root: Digest,
        message: &str,
        parent: Option<SnapshotId>,
    ) -> Result<SnapshotId, StorageError> {
        self.check_root(&root)?;

        let _guard = self.commit_lock.lock();
        let head = self.log.head();
        if head != parent {
            return Err(StorageError::ParentMismatch {
                expected: head,
                found: parent,
            });
        }
        self.append(root, message, parent)
    }

    /// Record a snapshot of `root` on top of the current HEAD.
    pub fn commit_head(&self, root: Digest, message: &str) -> Result<SnapshotId, StorageError> {
        self.check_root(&root)?;

        let _guard = self.commit_lock.lock();
        let parent = self.log.head();
        self.append(root, message, parent)
    }

    /// A commit root must be a stored object that decodes as a tree.
    fn check_root(&self, root: &Digest) -> Result<(), StorageError> {
        match read_tree(self.store.as_ref(), root) {
            Ok(_) => Ok(()),
            Err(StorageError::Corrupt(reason)) => {
                warn!(root = %root.short(), %reason, "Commit root is not a valid tree");
                Err(StorageError::NoContent(*root))
            }
            Err(StorageError::NotFound(_)) | Err(StorageError::KindMismatch { .. }) => {
                Err(StorageError::NoContent(*root))
            }
            Err(other) => Err(other),
        }
    }

    // Caller holds the commit lock.
    fn append(
        &self,
        root: Digest,
        message: &str,
        parent: Option<SnapshotId>,
    ) -> Result<SnapshotId, StorageError> {
        let snapshot = Snapshot {
            root,
            parent,
            author: self.author.clone(),
            message: message.to_string(),
            timestamp: Utc::now(),
        };
        let id = self
            .store
            .put_object(ObjectKind::Snapshot, &snapshot.encode())?;
        let index = self.log.append(id)?;

        info!(
            snapshot = %id.short(),
            root = %root.short(),
            index,
            "Committed snapshot"
        );
        Ok(id)
    }

    /// Resolve `HEAD`, `HEAD~k` or a full snapshot id.
    pub fn resolve(&self, reference: &str) -> Result<SnapshotId, StorageError> {
        match reference.parse::<RefSpec>()? {
            RefSpec::Head(k) => self.resolve_offset(k),
            RefSpec::Id(id) => self
                .log
                .position(&id)
                .map(|_| id)
                .ok_or(StorageError::NotFound(id)),
        }
    }

    /// The snapshot `k` commits back from HEAD.
    pub fn resolve_offset(&self, k: usize) -> Result<SnapshotId, StorageError> {
        let len = self.log.len();
        let out_of_range = StorageError::OutOfRange {
            requested: k,
            len: len as usize,
        };
        if k as u64 >= len {
            return Err(out_of_range);
        }
        self.log.get(len - 1 - k as u64).ok_or(out_of_range)
    }

    pub fn get_snapshot(&self, id: &SnapshotId) -> Result<Snapshot, StorageError> {
        let bytes = self.store.get_kind(id, ObjectKind::Snapshot)?;
        Snapshot::decode(&bytes)
    }

    /// Root tree digest of a snapshot.
    pub fn get_tree(&self, id: &SnapshotId) -> Result<Digest, StorageError> {
        Ok(self.get_snapshot(id)?.root)
    }

    pub fn head(&self) -> Option<SnapshotId> {
        self.log.head()
    }

    pub fn len(&self) -> usize {
        self.log.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Snapshots newest first.
    pub fn log(&self) -> Result<Vec<(SnapshotId, Snapshot)>, StorageError> {
        let len = self.log.len();
        let mut out = Vec::with_capacity(len as usize);
        for index in (0..len).rev() {
            let id = self
                .log
                .get(index)
                .ok_or_else(|| StorageError::Corrupt(format!("history index {} missing", index)))?;
            out.push((id, self.get_snapshot(&id)?));
        }
        Ok(out)
    }

    /// Re-derive every snapshot id and check each links to its predecessor.
    ///
    /// Returns the number of verified snapshots.
    pub fn verify_chain(&self) -> Result<usize, StorageError> {
        let len = self.log.len();
        let mut previous: Option<SnapshotId> = None;

        for index in 0..len {
            let id = self
                .log
                .get(index)
                .ok_or_else(|| StorageError::Corrupt(format!("history index {} missing", index)))?;
            let snapshot = self.get_snapshot(&id)?;

            let derived = compute_digest(ObjectKind::Snapshot, &snapshot.encode());
            if derived != id {
                warn!(index, expected = %id, actual = %derived, "Snapshot id mismatch");
                return Err(StorageError::Corrupt(format!(
                    "snapshot {} at index {} re-derives to {}",
                    id, index, derived
                )));
            }
            if snapshot.parent != previous {
                warn!(index, snapshot = %id, "Broken parent link");
                return Err(StorageError::Corrupt(format!(
                    "snapshot {} at index {} does not link to its predecessor",
                    id, index
                )));
            }
            if self.store.kind_of(&snapshot.root)? != Some(ObjectKind::Tree) {
                return Err(StorageError::NoContent(snapshot.root));
            }
            previous = Some(id);
        }
        Ok(len as usize)
    }
}

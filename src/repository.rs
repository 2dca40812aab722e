//! Repository
//!
//! The context value tying one object store to one history. Several
//! repositories can coexist in a process; nothing here is global.

use crate::config::{SnapConfig, StorageBackend};
use crate::diff::{ChangedPath, DiffEngine};
use crate::error::{ApiError, StorageError};
use crate::history::{History, MemoryHistoryLog, SledHistoryLog, Snapshot};
use crate::store::{MemoryObjectStore, ObjectStore, SledObjectStore};
use crate::tree::builder::{flatten, read_tree, TreeBuilder, WorkingNode};
use crate::tree::node::TreeEntry;
use crate::tree::walker::{scan_directory, ScanOptions};
use crate::types::{Digest, ObjectKind, SnapshotId};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// What a digest refers to, for "show object" style output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ObjectInfo {
    Blob { size: usize },
    Tree { entries: Vec<TreeEntry> },
    Snapshot { snapshot: Snapshot },
}

/// Object store plus snapshot history
pub struct Repository {
    store: Arc<dyn ObjectStore>,
    history: History,
    scan: ScanOptions,
    store_path: Option<PathBuf>,
}

impl Repository {
    /// A repository that lives only as long as the value.
    pub fn in_memory(author: impl Into<String>) -> Self {
        let store: Arc<dyn ObjectStore> = Arc::new(MemoryObjectStore::new());
        let history = History::new(store.clone(), Box::new(MemoryHistoryLog::new()), author);
        Self {
            store,
            history,
            scan: ScanOptions::default(),
            store_path: None,
        }
    }

    /// Open (or create) a sled-backed repository at `path`.
    pub fn open_at(path: &Path, author: impl Into<String>) -> Result<Self, StorageError> {
        std::fs::create_dir_all(path)?;
        let db = sled::open(path)?;
        let store: Arc<dyn ObjectStore> = Arc::new(SledObjectStore::from_db(&db)?);
        let log = SledHistoryLog::from_db(&db)?;
        let history = History::new(store.clone(), Box::new(log), author);

        info!(path = %path.display(), snapshots = history.len(), "Opened repository");
        Ok(Self {
            store,
            history,
            scan: ScanOptions::default(),
            store_path: Some(path.to_path_buf()),
        })
    }

    /// Open a repository as configured; relative store paths resolve against `root`.
    pub fn open(config: &SnapConfig, root: Option<&Path>) -> Result<Self, ApiError> {
        let mut repo = match config.storage.backend {
            StorageBackend::Memory => Self::in_memory(config.author.clone()),
            StorageBackend::Sled => {
                let path = config.storage.resolve_path(root)?;
                Self::open_at(&path, config.author.clone())?
            }
        };
        repo.scan.ignore_names = config.storage.ignore.clone();
        Ok(repo)
    }

    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn put(&self, bytes: &[u8]) -> Result<Digest, StorageError> {
        self.store.put(bytes)
    }

    pub fn get(&self, digest: &Digest) -> Result<Vec<u8>, StorageError> {
        self.store.get(digest)
    }

    pub fn build_tree(&self, entries: Vec<TreeEntry>) -> Result<Digest, StorageError> {
        TreeBuilder::new(self.store()).build_tree(entries)
    }

    pub fn build_directory(
        &self,
        root: &BTreeMap<String, WorkingNode>,
    ) -> Result<Digest, StorageError> {
        TreeBuilder::new(self.store()).build_directory(root)
    }

    pub fn commit(
        &self,
        root: Digest,
        message: &str,
        parent: Option<SnapshotId>,
    ) -> Result<SnapshotId, StorageError> {
        self.history.commit(root, message, parent)
    }

    pub fn commit_head(&self, root: Digest, message: &str) -> Result<SnapshotId, StorageError> {
        self.history.commit_head(root, message)
    }

    pub fn resolve(&self, reference: &str) -> Result<SnapshotId, StorageError> {
        self.history.resolve(reference)
    }

    pub fn get_tree(&self, id: &SnapshotId) -> Result<Digest, StorageError> {
        self.history.get_tree(id)
    }

    pub fn diff_trees(&self, a: &Digest, b: &Digest) -> Result<Vec<ChangedPath>, StorageError> {
        DiffEngine::new(self.store()).diff_trees(a, b)
    }

    /// Changed paths between the trees of two snapshot references.
    pub fn diff_refs(&self, from: &str, to: &str) -> Result<Vec<ChangedPath>, StorageError> {
        let from_tree = self.get_tree(&self.resolve(from)?)?;
        let to_tree = self.get_tree(&self.resolve(to)?)?;
        self.diff_trees(&from_tree, &to_tree)
    }

    /// Describe any stored object.
    pub fn inspect(&self, digest: &Digest) -> Result<ObjectInfo, StorageError> {
        let object = self.store.get_object(digest)?;
        Ok(match object.kind {
            ObjectKind::Blob => ObjectInfo::Blob {
                size: object.data.len(),
            },
            ObjectKind::Tree => ObjectInfo::Tree {
                entries: crate::tree::node::Tree::decode(&object.data)?.entries().to_vec(),
            },
            ObjectKind::Snapshot => ObjectInfo::Snapshot {
                snapshot: Snapshot::decode(&object.data)?,
            },
        })
    }

    /// Ordered entries of a stored tree.
    pub fn tree_entries(&self, digest: &Digest) -> Result<Vec<TreeEntry>, StorageError> {
        Ok(read_tree(self.store(), digest)?.entries().to_vec())
    }

    /// Every file path under a tree with its blob digest.
    pub fn manifest(&self, tree: &Digest) -> Result<BTreeMap<String, Digest>, StorageError> {
        flatten(self.store(), tree)
    }

    /// Scan a directory and commit it on top of HEAD.
    ///
    /// The repository's own store directory is skipped when it lies inside `dir`.
    pub fn snapshot_dir(&self, dir: &Path, message: &str) -> Result<SnapshotId, StorageError> {
        let mut options = self.scan.clone();
        if let Some(path) = &self.store_path {
            options.exclude_paths.push(path.clone());
        }
        let root = scan_directory(self.store(), dir, &options)?;
        self.commit_head(root, message)
    }

    pub fn flush(&self) -> Result<(), StorageError> {
        self.store.flush()
    }
}

//! Tree Builder
//!
//! Turns named entry sets into stored, canonically encoded tree objects.
//! Directories are assembled bottom-up: every subtree is stored (and its
//! digest known) before the parent that references it.

use crate::error::StorageError;
use crate::store::ObjectStore;
use crate::tree::node::{EntryKind, FileMode, Tree, TreeEntry};
use crate::types::{Digest, ObjectKind};
use std::collections::BTreeMap;
use tracing::debug;

/// In-memory description of a directory, as supplied by a working-tree scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkingNode {
    File { content: Vec<u8>, mode: FileMode },
    Dir(BTreeMap<String, WorkingNode>),
}

impl WorkingNode {
    pub fn file(content: impl Into<Vec<u8>>) -> Self {
        WorkingNode::File {
            content: content.into(),
            mode: FileMode::Regular,
        }
    }

    pub fn executable(content: impl Into<Vec<u8>>) -> Self {
        WorkingNode::File {
            content: content.into(),
            mode: FileMode::Executable,
        }
    }

    pub fn dir<I, S>(children: I) -> Self
    where
        I: IntoIterator<Item = (S, WorkingNode)>,
        S: Into<String>,
    {
        WorkingNode::Dir(children.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Builds tree objects into an object store
pub struct TreeBuilder<'a> {
    store: &'a dyn ObjectStore,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(store: &'a dyn ObjectStore) -> Self {
        Self { store }
    }

    /// Store a tree made of `entries` and return its digest.
    ///
    /// Entry order does not matter. Every referenced object must already be
    /// stored with the kind the entry declares.
    pub fn build_tree(&self, entries: Vec<TreeEntry>) -> Result<Digest, StorageError> {
        let tree = Tree::from_entries(entries)?;

        for entry in tree.entries() {
            let expected = match entry.kind {
                EntryKind::Blob => ObjectKind::Blob,
                EntryKind::Tree => ObjectKind::Tree,
            };
            match self.store.kind_of(&entry.digest)? {
                None => return Err(StorageError::NotFound(entry.digest)),
                Some(found) if found != expected => {
                    return Err(StorageError::KindMismatch {
                        digest: entry.digest,
                        expected,
                        found,
                    })
                }
                Some(_) => {}
            }
        }

        let digest = self.store.put_object(ObjectKind::Tree, &tree.encode())?;
        debug!(tree = %digest.short(), entries = tree.len(), "Built tree");
        Ok(digest)
    }

    /// Store a whole directory description, blobs first, and return the root digest.
    pub fn build_directory(&self, root: &BTreeMap<String, WorkingNode>) -> Result<Digest, StorageError> {
        let mut entries = Vec::with_capacity(root.len());
        for (name, node) in root {
            let entry = match node {
                WorkingNode::File { content, mode } => TreeEntry {
                    name: name.clone(),
                    kind: EntryKind::Blob,
                    digest: self.store.put(content)?,
                    mode: *mode,
                },
                WorkingNode::Dir(children) => {
                    TreeEntry::tree(name.clone(), self.build_directory(children)?)
                }
            };
            entries.push(entry);
        }
        self.build_tree(entries)
    }

    /// Load and decode a stored tree.
    pub fn read_tree(&self, digest: &Digest) -> Result<Tree, StorageError> {
        read_tree(self.store, digest)
    }
}

/// Load and decode the tree stored under `digest`.
pub fn read_tree(store: &dyn ObjectStore, digest: &Digest) -> Result<Tree, StorageError> {
    let bytes = store.get_kind(digest, ObjectKind::Tree)?;
    Tree::decode(&bytes)
}

/// Flatten a tree into `path -> blob digest`, paths joined with `/`.
pub fn flatten(
    store: &dyn ObjectStore,
    digest: &Digest,
) -> Result<BTreeMap<String, Digest>, StorageError> {
    let mut files = BTreeMap::new();
    flatten_into(store, digest, "", &mut files)?;
    Ok(files)
}

fn flatten_into(
    store: &dyn ObjectStore,
    digest: &Digest,
    prefix: &str,
    files: &mut BTreeMap<String, Digest>,
) -> Result<(), StorageError> {
    for entry in read_tree(store, digest)?.entries() {
        let path = join_path(prefix, &entry.name);
        match entry.kind {
            EntryKind::Blob => {
                files.insert(path, entry.digest);
            }
            EntryKind::Tree => flatten_into(store, &entry.digest, &path, files)?,
        }
    }
    Ok(())
}

pub(crate) fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}

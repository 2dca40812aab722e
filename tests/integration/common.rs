//! Shared fixtures

use parking_lot::Mutex;
use snapstore::store::{MemoryObjectStore, ObjectStore, StoredObject};
use snapstore::tree::{TreeBuilder, WorkingNode};
use snapstore::{Digest, ObjectKind, StorageError};
use std::collections::BTreeMap;

/// Records every digest read through it
pub struct CountingStore {
    inner: MemoryObjectStore,
    reads: Mutex<Vec<Digest>>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryObjectStore::new(),
            reads: Mutex::new(Vec::new()),
        }
    }

    pub fn reads(&self) -> Vec<Digest> {
        self.reads.lock().clone()
    }

    pub fn reset(&self) {
        self.reads.lock().clear();
    }
}

impl ObjectStore for CountingStore {
    fn put_object(&self, kind: ObjectKind, bytes: &[u8]) -> Result<Digest, StorageError> {
        self.inner.put_object(kind, bytes)
    }

    fn get_object(&self, digest: &Digest) -> Result<StoredObject, StorageError> {
        self.reads.lock().push(*digest);
        self.inner.get_object(digest)
    }

    fn kind_of(&self, digest: &Digest) -> Result<Option<ObjectKind>, StorageError> {
        self.inner.kind_of(digest)
    }

    fn len(&self) -> Result<usize, StorageError> {
        self.inner.len()
    }
}

pub fn build(store: &dyn ObjectStore, root: Vec<(&str, WorkingNode)>) -> Digest {
    let root: BTreeMap<String, WorkingNode> =
        root.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
    TreeBuilder::new(store).build_directory(&root).unwrap()
}

//! In-memory object store.

use super::{ObjectStore, StoredObject};
use crate::error::StorageError;
use crate::tree::hasher::compute_digest;
use crate::types::{Digest, ObjectKind};
use parking_lot::RwLock;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::debug;

/// Object store backed by a locked hash map; lives as long as the value does.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<Digest, StoredObject>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ObjectStore for MemoryObjectStore {
    fn put_object(&self, kind: ObjectKind, bytes: &[u8]) -> Result<Digest, StorageError> {
        let digest = compute_digest(kind, bytes);

        // Fast path: most repeated content is already present
        if self.objects.read().contains_key(&digest) {
            debug!(digest = %digest.short(), %kind, "Object already stored");
            return Ok(digest);
        }

        let mut objects = self.objects.write();
        match objects.entry(digest) {
            Entry::Occupied(_) => {
                debug!(digest = %digest.short(), %kind, "Object already stored");
            }
            Entry::Vacant(slot) => {
                slot.insert(StoredObject {
                    kind,
                    data: bytes.to_vec(),
                });
                debug!(digest = %digest.short(), %kind, size = bytes.len(), "Stored object");
            }
        }
        Ok(digest)
    }

    fn get_object(&self, digest: &Digest) -> Result<StoredObject, StorageError> {
        self.objects
            .read()
            .get(digest)
            .cloned()
            .ok_or(StorageError::NotFound(*digest))
    }

    fn kind_of(&self, digest: &Digest) -> Result<Option<ObjectKind>, StorageError> {
        Ok(self.objects.read().get(digest).map(|o| o.kind))
    }

    fn len(&self) -> Result<usize, StorageError> {
        Ok(self.objects.read().len())
    }
}

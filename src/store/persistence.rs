//! Sled-backed object store.
//!
//! Objects live in the `objects` tree, keyed by the raw 32-byte digest. The
//! value is the kind byte followed by the object's bytes.

use super::{ObjectStore, StoredObject};
use crate::error::StorageError;
use crate::tree::hasher::compute_digest;
use crate::types::{Digest, ObjectKind};
use std::path::Path;
use tracing::{debug, warn};

const OBJECTS_TREE: &str = "objects";

/// Persistent object store
pub struct SledObjectStore {
    objects: sled::Tree,
}

impl SledObjectStore {
    /// Open (or create) a store at `path`.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(path)?;
        let db = sled::open(path)?;
        Self::from_db(&db)
    }

    /// Build a store over an already opened database.
    pub fn from_db(db: &sled::Db) -> Result<Self, StorageError> {
        Ok(Self {
            objects: db.open_tree(OBJECTS_TREE)?,
        })
    }

    fn decode(digest: &Digest, value: &[u8]) -> Result<StoredObject, StorageError> {
        let (&kind_byte, data) = value
            .split_first()
            .ok_or_else(|| StorageError::Corrupt(format!("empty record for {}", digest)))?;
        let kind = ObjectKind::from_byte(kind_byte).ok_or_else(|| {
            StorageError::Corrupt(format!("unknown kind byte {} for {}", kind_byte, digest))
        })?;
        Ok(StoredObject {
            kind,
            data: data.to_vec(),
        })
    }
}

impl ObjectStore for SledObjectStore {
    fn put_object(&self, kind: ObjectKind, bytes: &[u8]) -> Result<Digest, StorageError> {
        let digest = compute_digest(kind, bytes);

        let mut value = Vec::with_capacity(bytes.len() + 1);
        value.push(kind.to_byte());
        value.extend_from_slice(bytes);

        // Write-if-absent: a lost race means another writer stored the same content
        match self
            .objects
            .compare_and_swap(digest.as_bytes(), None::<&[u8]>, Some(value))?
        {
            Ok(()) => {
                debug!(digest = %digest.short(), %kind, size = bytes.len(), "Stored object");
            }
            Err(_) => {
                debug!(digest = %digest.short(), %kind, "Object already stored");
            }
        }
        Ok(digest)
    }

    fn get_object(&self, digest: &Digest) -> Result<StoredObject, StorageError> {
        let value = self
            .objects
            .get(digest.as_bytes())?
            .ok_or(StorageError::NotFound(*digest))?;
        let object = Self::decode(digest, &value)?;

        let actual = compute_digest(object.kind, &object.data);
        if actual != *digest {
            warn!(expected = %digest, actual = %actual, "Stored object failed verification");
            return Err(StorageError::Corrupt(format!(
                "digest mismatch: expected {}, got {}",
                digest, actual
            )));
        }
        Ok(object)
    }

    fn kind_of(&self, digest: &Digest) -> Result<Option<ObjectKind>, StorageError> {
        match self.objects.get(digest.as_bytes())? {
            Some(value) => Ok(Some(Self::decode(digest, &value)?.kind)),
            None => Ok(None),
        }
    }

    fn len(&self) -> Result<usize, StorageError> {
        Ok(self.objects.len())
    }

    fn flush(&self) -> Result<(), StorageError> {
        self.objects.flush()?;
        Ok(())
    }
}

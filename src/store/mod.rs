//! Content Store
//!
//! Immutable objects keyed by the digest of their content. Identical content
//! collapses to a single stored object; nothing is ever mutated or removed.

pub mod memory;
pub mod persistence;

pub use memory::MemoryObjectStore;
pub use persistence::SledObjectStore;

use crate::error::StorageError;
use crate::types::{Digest, ObjectKind};

/// An object as held by a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub kind: ObjectKind,
    pub data: Vec<u8>,
}

/// Object store interface
///
/// `put_object` must be write-if-absent: concurrent puts of identical content
/// leave exactly one stored object and all return the same digest.
pub trait ObjectStore: Send + Sync {
    fn put_object(&self, kind: ObjectKind, bytes: &[u8]) -> Result<Digest, StorageError>;
    fn get_object(&self, digest: &Digest) -> Result<StoredObject, StorageError>;
    fn kind_of(&self, digest: &Digest) -> Result<Option<ObjectKind>, StorageError>;
    /// Number of distinct stored objects
    fn len(&self) -> Result<usize, StorageError>;

    /// Store file content as a blob.
    fn put(&self, bytes: &[u8]) -> Result<Digest, StorageError> {
        self.put_object(ObjectKind::Blob, bytes)
    }

    /// Fetch the bytes of any stored object.
    fn get(&self, digest: &Digest) -> Result<Vec<u8>, StorageError> {
        Ok(self.get_object(digest)?.data)
    }

    fn contains(&self, digest: &Digest) -> Result<bool, StorageError> {
        Ok(self.kind_of(digest)?.is_some())
    }

    /// Make prior writes durable; a no-op for stores without a disk.
    fn flush(&self) -> Result<(), StorageError> {
        Ok(())
    }

    fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }

    /// Fetch an object and check it has the expected kind.
    fn get_kind(&self, digest: &Digest, expected: ObjectKind) -> Result<Vec<u8>, StorageError> {
        let object = self.get_object(digest)?;
        if object.kind != expected {
            return Err(StorageError::KindMismatch {
                digest: *digest,
                expected,
                found: object.kind,
            });
        }
        Ok(object.data)
    }
}

//! Digest computation for stored objects

use crate::types::{Digest, ObjectKind};

/// Compute the digest of an object of the given kind.
///
/// The kind tag and byte length are hashed ahead of the content
/// (`"<tag> <len>\0" ‖ bytes`), so a blob never shares a digest with a tree or
/// snapshot that happens to have the same bytes.
pub fn compute_digest(kind: ObjectKind, bytes: &[u8]) -> Digest {
    let mut hasher = blake3::Hasher::new();
    hasher.update(kind.tag().as_bytes());
    hasher.update(b" ");
    hasher.update(bytes.len().to_string().as_bytes());
    hasher.update(&[0u8]);
    hasher.update(bytes);
    Digest::from_bytes(*hasher.finalize().as_bytes())
}

/// Digest of raw file content stored as a blob
pub fn blob_digest(bytes: &[u8]) -> Digest {
    compute_digest(ObjectKind::Blob, bytes)
}

//! Error types for the snapshot store.

use crate::types::{Digest, ObjectKind};
use thiserror::Error;

/// Errors raised by the object store, tree builder, history and diff engine
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(Digest),

    #[error("Duplicate entry name in tree: {0}")]
    DuplicateEntry(String),

    #[error("Commit root does not resolve to a stored tree: {0}")]
    NoContent(Digest),

    #[error("Reference out of range: HEAD~{requested} with {len} snapshot(s) in history")]
    OutOfRange { requested: usize, len: usize },

    #[error("Invalid reference: {0}")]
    InvalidRef(String),

    #[error("Invalid entry name: {0:?}")]
    InvalidEntryName(String),

    #[error("Object {digest} is a {found}, expected a {expected}")]
    KindMismatch {
        digest: Digest,
        expected: ObjectKind,
        found: ObjectKind,
    },

    #[error("Parent mismatch: history head is {expected:?}, commit named {found:?}")]
    ParentMismatch {
        expected: Option<Digest>,
        found: Option<Digest>,
    },

    #[error("Corrupt object data: {0}")]
    Corrupt(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sled::Error),

    #[error("Encoding error: {0}")]
    Encoding(#[from] bincode::Error),
}

/// Errors surfaced by the repository facade, configuration and logging setup
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    StorageError(#[from] StorageError),
}

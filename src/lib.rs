//! Snapstore: Content-Addressed Snapshots
//!
//! A content-addressed object store with Merkle-tree versioning: blobs and
//! trees are stored under the digest of their content, snapshots chain to
//! their parent by id, and tree diffs skip every subtree whose digest is
//! unchanged.

pub mod config;
pub mod diff;
pub mod error;
pub mod history;
pub mod logging;
pub mod repository;
pub mod store;
pub mod tree;
pub mod types;

pub use diff::{ChangeKind, ChangedPath, DiffEngine, DiffSummary};
pub use error::{ApiError, StorageError};
pub use history::{History, RefSpec, Snapshot};
pub use repository::{ObjectInfo, Repository};
pub use store::{MemoryObjectStore, ObjectStore, SledObjectStore};
pub use tree::{EntryKind, FileMode, Tree, TreeBuilder, TreeEntry, WorkingNode};
pub use types::{Digest, ObjectKind, SnapshotId};

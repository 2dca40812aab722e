//! Filesystem Merkle Tree
//!
//! Directories are stored as canonically encoded tree objects whose digests
//! cover their children, so identical directories share one stored tree.

pub mod builder;
pub mod hasher;
pub mod node;
pub mod walker;

pub use builder::{flatten, read_tree, TreeBuilder, WorkingNode};
pub use node::{EntryKind, FileMode, Tree, TreeEntry};
pub use walker::{scan_directory, ScanOptions};

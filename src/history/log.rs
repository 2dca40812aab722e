//! Append-only history log
//!
//! Records snapshot ids in commit order. Entries are never removed or reordered.

use crate::error::StorageError;
use crate::types::SnapshotId;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

const HISTORY_TREE: &str = "history";

/// History log interface
pub trait HistoryLog: Send + Sync {
    /// Append a snapshot id; returns its index.
    fn append(&self, id: SnapshotId) -> Result<u64, StorageError>;
    fn get(&self, index: u64) -> Option<SnapshotId>;
    fn position(&self, id: &SnapshotId) -> Option<u64>;
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn head(&self) -> Option<SnapshotId> {
        self.len().checked_sub(1).and_then(|idx| self.get(idx))
    }
}

#[derive(Default)]
struct LogIndex {
    ids: Vec<SnapshotId>,
    positions: HashMap<SnapshotId, u64>,
}

impl LogIndex {
    fn push(&mut self, id: SnapshotId) -> u64 {
        let index = self.ids.len() as u64;
        self.ids.push(id);
        // First occurrence wins; a snapshot id cannot legitimately repeat
        self.positions.entry(id).or_insert(index);
        index
    }
}

/// History log held in memory
#[derive(Default)]
pub struct MemoryHistoryLog {
    index: RwLock<LogIndex>,
}

impl MemoryHistoryLog {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryLog for MemoryHistoryLog {
    fn append(&self, id: SnapshotId) -> Result<u64, StorageError> {
        Ok(self.index.write().push(id))
    }

    fn get(&self, index: u64) -> Option<SnapshotId> {
        self.index.read().ids.get(index as usize).copied()
    }

    fn position(&self, id: &SnapshotId) -> Option<u64> {
        self.index.read().positions.get(id).copied()
    }

    fn len(&self) -> u64 {
        self.index.read().ids.len() as u64
    }
}

/// On-disk log record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub index: u64,
    pub snapshot_id: [u8; 32],
}

/// History log persisted in the `history` sled tree, keyed by big-endian index
pub struct SledHistoryLog {
    tree: sled::Tree,
    index: RwLock<LogIndex>,
}

impl SledHistoryLog {
    /// Open the log and rebuild the in-memory index.
    pub fn from_db(db: &sled::Db) -> Result<Self, StorageError> {
        let tree = db.open_tree(HISTORY_TREE)?;
        let mut index = LogIndex::default();

        for item in tree.iter() {
            let (_, value) = item?;
            let record: HistoryRecord = bincode::deserialize(&value)?;
            if record.index != index.ids.len() as u64 {
                return Err(StorageError::Corrupt(format!(
                    "history gap: expected index {}, found {}",
                    index.ids.len(),
                    record.index
                )));
            }
            index.push(SnapshotId::from_bytes(record.snapshot_id));
        }

        debug!(entries = index.ids.len(), "Loaded history log");
        Ok(Self {
            tree,
            index: RwLock::new(index),
        })
    }
}

impl HistoryLog for SledHistoryLog {
    fn append(&self, id: SnapshotId) -> Result<u64, StorageError> {
        let mut index = self.index.write();
        let position = index.ids.len() as u64;
        let record = HistoryRecord {
            index: position,
            snapshot_id: *id.as_bytes(),
        };

        self.tree
            .insert(position.to_be_bytes(), bincode::serialize(&record)?)?;
        self.tree.flush()?;

        Ok(index.push(id))
    }

    fn get(&self, index: u64) -> Option<SnapshotId> {
        self.index.read().ids.get(index as usize).copied()
    }

    fn position(&self, id: &SnapshotId) -> Option<u64> {
        self.index.read().positions.get(id).copied()
    }

    fn len(&self) -> u64 {
        self.index.read().ids.len() as u64
    }
}

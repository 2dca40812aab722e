//! Snapshot reference parsing: `HEAD`, `HEAD~k`, or a full snapshot id.

use crate::error::StorageError;
use crate::types::SnapshotId;
use std::str::FromStr;

/// A parsed snapshot reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefSpec {
    /// `k` snapshots back from HEAD
    Head(usize),
    Id(SnapshotId),
}

impl FromStr for RefSpec {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "HEAD" {
            return Ok(RefSpec::Head(0));
        }
        if let Some(offset) = s.strip_prefix("HEAD~") {
            if offset.is_empty() {
                return Ok(RefSpec::Head(1));
            }
            if !offset.bytes().all(|b| b.is_ascii_digit()) {
                return Err(StorageError::InvalidRef(s.to_string()));
            }
            return offset
                .parse::<usize>()
                .map(RefSpec::Head)
                .map_err(|_| StorageError::InvalidRef(s.to_string()));
        }
        if s.len() == 64 {
            if let Ok(id) = SnapshotId::from_hex(s) {
                return Ok(RefSpec::Id(id));
            }
        }
        Err(StorageError::InvalidRef(s.to_string()))
    }
}

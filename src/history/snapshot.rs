//! Snapshot records and their canonical encoding

use crate::error::StorageError;
use crate::tree::hasher::compute_digest;
use crate::types::{Digest, ObjectKind, SnapshotId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SNAPSHOT_MAGIC: &[u8; 4] = b"SNS1";

/// Immutable record of one moment in history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub root: Digest,
    pub parent: Option<SnapshotId>,
    pub author: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Snapshot {
    /// Identity of this snapshot; covers every field, the parent id included.
    pub fn id(&self) -> SnapshotId {
        compute_digest(ObjectKind::Snapshot, &self.encode())
    }

    /// Canonical byte form.
    ///
    /// Format:
    /// - magic: `SNS1`
    /// - root digest: [u8; 32]
    /// - parent: u8 flag (0 = none, 1 = present), then [u8; 32] when present
    /// - timestamp: i64 LE seconds, u32 LE nanoseconds
    /// - author: u32 LE length, UTF-8 bytes
    /// - message: u32 LE length, UTF-8 bytes
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes =
            Vec::with_capacity(4 + 32 + 33 + 12 + 8 + self.author.len() + self.message.len());
        bytes.extend_from_slice(SNAPSHOT_MAGIC);
        bytes.extend_from_slice(self.root.as_bytes());
        match &self.parent {
            Some(parent) => {
                bytes.push(1);
                bytes.extend_from_slice(parent.as_bytes());
            }
            None => bytes.push(0),
        }
        bytes.extend_from_slice(&self.timestamp.timestamp().to_le_bytes());
        bytes.extend_from_slice(&self.timestamp.timestamp_subsec_nanos().to_le_bytes());
        write_str(&mut bytes, &self.author);
        write_str(&mut bytes, &self.message);
        bytes
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, StorageError> {
        let mut cursor = Cursor { bytes, offset: 0 };
        if cursor.take(4)? != SNAPSHOT_MAGIC {
            return Err(corrupt("bad snapshot magic"));
        }
        let root = cursor.digest()?;
        let parent = match cursor.take(1)?[0] {
            0 => None,
            1 => Some(cursor.digest()?),
            other => return Err(corrupt(&format!("bad parent flag {}", other))),
        };

        let mut secs = [0u8; 8];
        secs.copy_from_slice(cursor.take(8)?);
        let mut nanos = [0u8; 4];
        nanos.copy_from_slice(cursor.take(4)?);
        let timestamp =
            DateTime::from_timestamp(i64::from_le_bytes(secs), u32::from_le_bytes(nanos))
                .ok_or_else(|| corrupt("timestamp out of range"))?;

        let author = cursor.string()?;
        let message = cursor.string()?;
        if cursor.offset != bytes.len() {
            return Err(corrupt("trailing bytes"));
        }

        Ok(Self {
            root,
            parent,
            author,
            message,
            timestamp,
        })
    }
}

fn write_str(bytes: &mut Vec<u8>, s: &str) {
    bytes.extend_from_slice(&(s.len() as u32).to_le_bytes());
    bytes.extend_from_slice(s.as_bytes());
}

fn corrupt(msg: &str) -> StorageError {
    StorageError::Corrupt(format!("snapshot: {}", msg))
}

struct Cursor<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], StorageError> {
        let end = self
            .offset
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| corrupt("truncated"))?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn digest(&mut self) -> Result<Digest, StorageError> {
        let mut raw = [0u8; 32];
        raw.copy_from_slice(self.take(32)?);
        Ok(Digest::from_bytes(raw))
    }

    fn string(&mut self) -> Result<String, StorageError> {
        let mut len = [0u8; 4];
        len.copy_from_slice(self.take(4)?);
        let raw = self.take(u32::from_le_bytes(len) as usize)?;
        String::from_utf8(raw.to_vec()).map_err(|_| corrupt("string is not UTF-8"))
    }
}

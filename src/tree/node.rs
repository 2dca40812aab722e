//! Tree entry types and the canonical tree encoding

use crate::error::StorageError;
use crate::types::Digest;
use serde::{Deserialize, Serialize};

const TREE_MAGIC: &[u8; 4] = b"SNT1";

/// What a tree entry points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    Tree,
}

/// Executable flag carried by blob entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileMode {
    #[default]
    Regular,
    Executable,
}

/// One named entry of a tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreeEntry {
    pub name: String,
    pub kind: EntryKind,
    pub digest: Digest,
    pub mode: FileMode,
}

impl TreeEntry {
    pub fn blob(name: impl Into<String>, digest: Digest) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Blob,
            digest,
            mode: FileMode::Regular,
        }
    }

    pub fn executable(name: impl Into<String>, digest: Digest) -> Self {
        Self {
            mode: FileMode::Executable,
            ..Self::blob(name, digest)
        }
    }

    pub fn tree(name: impl Into<String>, digest: Digest) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Tree,
            digest,
            mode: FileMode::Regular,
        }
    }

    pub fn is_tree(&self) -> bool {
        self.kind == EntryKind::Tree
    }
}

/// Check that a name can appear as a single path component.
pub fn validate_name(name: &str) -> Result<(), StorageError> {
    if name.is_empty() || name == "." || name == ".." || name.contains('/') || name.contains('\0')
    {
        return Err(StorageError::InvalidEntryName(name.to_string()));
    }
    Ok(())
}

/// A decoded tree: entries in canonical (byte-lexicographic) name order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    /// Build a canonical tree from entries in any order.
    ///
    /// Rejects invalid names and duplicate names.
    pub fn from_entries(mut entries: Vec<TreeEntry>) -> Result<Self, StorageError> {
        for entry in &entries {
            validate_name(&entry.name)?;
        }
        entries.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));
        if let Some(pair) = entries.windows(2).find(|w| w[0].name == w[1].name) {
            return Err(StorageError::DuplicateEntry(pair[0].name.clone()));
        }
        // Trees carry no executable flag
        for entry in entries.iter_mut().filter(|e| e.is_tree()) {
            entry.mode = FileMode::Regular;
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries
            .binary_search_by(|e| e.name.as_bytes().cmp(name.as_bytes()))
            .ok()
            .map(|idx| &self.entries[idx])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize to the canonical byte form.
    ///
    /// Format:
    /// - magic: `SNT1`
    /// - entry count: u32 LE
    /// - per entry: kind u8, mode u8, digest [u8; 32], name length u32 LE, name bytes
    pub fn encode(&self) -> Vec<u8> {
        let body: usize = self.entries.iter().map(|e| 2 + 32 + 4 + e.name.len()).sum();
        let mut bytes = Vec::with_capacity(8 + body);
        bytes.extend_from_slice(TREE_MAGIC);
        bytes.extend_from_slice(&(self.entries.len() as u32).to_le_bytes());

        for entry in &self.entries {
            bytes.push(match entry.kind {
                EntryKind::Blob => 0,
                EntryKind::Tree => 1,
            });
            bytes.push(match entry.mode {
                FileMode::Regular => 0,
                FileMode::Executable => 1,
            });
            bytes.extend_from_slice(entry.digest.as_bytes());
            bytes.extend_from_slice(&(entry.name.len() as u32).to_le_bytes());
            bytes.extend_from_slice(entry.name.as_bytes());
        }
        bytes
    }

    /// Parse the canonical byte form; non-canonical input is rejected.
    pub fn decode(bytes: &[u8]) -> Result<Self, StorageError> {
        let mut reader = Reader { bytes, offset: 0 };

        if reader.take(4)? != TREE_MAGIC {
            return Err(corrupt("bad tree magic"));
        }
        let count = reader.u32()? as usize;

        let mut entries: Vec<TreeEntry> = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            let kind = match reader.u8()? {
                0 => EntryKind::Blob,
                1 => EntryKind::Tree,
                other => return Err(corrupt(&format!("unknown entry kind {}", other))),
            };
            let mode = match reader.u8()? {
                0 => FileMode::Regular,
                1 => FileMode::Executable,
                other => return Err(corrupt(&format!("unknown entry mode {}", other))),
            };
            if kind == EntryKind::Tree && mode != FileMode::Regular {
                return Err(corrupt("tree entry carries executable mode"));
            }
            let mut digest = [0u8; 32];
            digest.copy_from_slice(reader.take(32)?);
            let name_len = reader.u32()? as usize;
            let name = std::str::from_utf8(reader.take(name_len)?)
                .map_err(|_| corrupt("entry name is not UTF-8"))?
                .to_string();
            validate_name(&name).map_err(|_| corrupt(&format!("invalid entry name {:?}", name)))?;

            if let Some(prev) = entries.last() {
                if prev.name.as_bytes() >= name.as_bytes() {
                    return Err(corrupt("entries out of canonical order"));
                }
            }
            entries.push(TreeEntry {
                name,
                kind,
                digest: Digest::from_bytes(digest),
                mode,
            });
        }

        if reader.offset != bytes.len() {
            return Err(corrupt("trailing bytes after tree entries"));
        }
        Ok(Self { entries })
    }
}

fn corrupt(msg: &str) -> StorageError {
    StorageError::Corrupt(format!("tree: {}", msg))
}

struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
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

    fn u8(&mut self) -> Result<u8, StorageError> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32, StorageError> {
        let raw = self.take(4)?;
        Ok(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }
}

//! Working-tree scanner
//!
//! Walks a directory on disk and feeds its files and subdirectories to the
//! tree builder, closing each subdirectory before its parent. Symlinks are
//! not followed.

use crate::error::StorageError;
use crate::store::ObjectStore;
use crate::tree::builder::TreeBuilder;
use crate::tree::node::{FileMode, TreeEntry};
use crate::types::Digest;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use unicode_normalization::UnicodeNormalization;
use walkdir::{DirEntry, WalkDir};

/// Scanner configuration
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Entry names skipped at any depth
    pub ignore_names: Vec<String>,
    /// Absolute paths skipped entirely (e.g. a store living inside the scanned tree)
    pub exclude_paths: Vec<PathBuf>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            ignore_names: vec![".git".to_string()],
            exclude_paths: Vec::new(),
        }
    }
}

impl ScanOptions {
    fn is_excluded(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return false;
        }
        // Names are stored NFC-normalized, so match them in that form
        let name: String = entry.file_name().to_string_lossy().nfc().collect();
        self.ignore_names
            .iter()
            .any(|n| n.nfc().eq(name.chars()))
            || self.exclude_paths.iter().any(|p| entry.path() == p)
    }
}

/// Scan `root` into the store and return the digest of its tree.
pub fn scan_directory(
    store: &dyn ObjectStore,
    root: &Path,
    options: &ScanOptions,
) -> Result<Digest, StorageError> {
    let root = dunce::canonicalize(root)?;
    let exclude: Vec<PathBuf> = options
        .exclude_paths
        .iter()
        .filter_map(|p| dunce::canonicalize(p).ok())
        .collect();
    let options = ScanOptions {
        ignore_names: options.ignore_names.clone(),
        exclude_paths: exclude,
    };

    let builder = TreeBuilder::new(store);
    // open[d] holds the name and collected entries of the directory open at depth d
    let mut open: Vec<(String, Vec<TreeEntry>)> = Vec::new();
    let mut files = 0usize;

    let walker = WalkDir::new(&root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !options.is_excluded(e));

    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        let depth = entry.depth();
        let file_type = entry.file_type();

        if depth == 0 {
            if !file_type.is_dir() {
                break;
            }
            open.push((String::new(), Vec::new()));
            continue;
        }

        // Siblings and shallower entries close every deeper directory
        while open.len() > depth {
            close_directory(&builder, &mut open)?;
        }

        if file_type.is_symlink() {
            debug!(path = %entry.path().display(), "Skipping symlink");
        } else if file_type.is_dir() {
            open.push((entry_name(&entry)?, Vec::new()));
        } else if file_type.is_file() {
            let content = std::fs::read(entry.path())?;
            let digest = store.put(&content)?;
            let name = entry_name(&entry)?;
            let mode = file_mode(&entry)?;
            if let Some((_, entries)) = open.last_mut() {
                entries.push(TreeEntry {
                    mode,
                    ..TreeEntry::blob(name, digest)
                });
            }
            files += 1;
        }
    }

    while open.len() > 1 {
        close_directory(&builder, &mut open)?;
    }
    match open.pop() {
        Some((_, entries)) => {
            let digest = builder.build_tree(entries)?;
            info!(root = %root.display(), tree = %digest.short(), files, "Scanned directory");
            Ok(digest)
        }
        None => Err(StorageError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} is not a directory", root.display()),
        ))),
    }
}

/// Build the innermost open directory and record it in its parent.
fn close_directory(
    builder: &TreeBuilder<'_>,
    open: &mut Vec<(String, Vec<TreeEntry>)>,
) -> Result<(), StorageError> {
    if let Some((name, entries)) = open.pop() {
        let digest = builder.build_tree(entries)?;
        if let Some((_, parent)) = open.last_mut() {
            parent.push(TreeEntry::tree(name, digest));
        }
    }
    Ok(())
}

fn entry_name(entry: &DirEntry) -> Result<String, StorageError> {
    let name = entry
        .file_name()
        .to_str()
        .ok_or_else(|| StorageError::InvalidEntryName(entry.file_name().to_string_lossy().into()))?;
    Ok(name.nfc().collect())
}

#[cfg(unix)]
fn file_mode(entry: &DirEntry) -> Result<FileMode, StorageError> {
    use std::os::unix::fs::PermissionsExt;
    let metadata = entry.metadata().map_err(std::io::Error::from)?;
    if metadata.permissions().mode() & 0o111 != 0 {
        Ok(FileMode::Executable)
    } else {
        Ok(FileMode::Regular)
    }
}

#[cfg(not(unix))]
fn file_mode(_entry: &DirEntry) -> Result<FileMode, StorageError> {
    Ok(FileMode::Regular)
}

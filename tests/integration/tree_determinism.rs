use proptest::prelude::*;
use snapstore::store::{MemoryObjectStore, ObjectStore};
use snapstore::tree::{scan_directory, ScanOptions, TreeBuilder, TreeEntry, WorkingNode};
use snapstore::StorageError;
use std::collections::BTreeMap;
use std::fs;
use tempfile::TempDir;

fn entries_for(store: &MemoryObjectStore, files: &BTreeMap<String, Vec<u8>>) -> Vec<TreeEntry> {
    files
        .iter()
        .map(|(name, content)| TreeEntry::blob(name.clone(), store.put(content).unwrap()))
        .collect()
}

proptest! {
    #[test]
    fn prop_build_tree_ignores_input_order(
        files in prop::collection::btree_map("[a-zA-Z0-9_.-]{1,12}", prop::collection::vec(any::<u8>(), 0..64), 1..16),
        seed in any::<u64>(),
    ) {
        prop_assume!(files.keys().all(|k| k != "." && k != ".."));
        let store = MemoryObjectStore::new();
        let builder = TreeBuilder::new(&store);

        let sorted = entries_for(&store, &files);
        let mut shuffled = sorted.clone();
        shuffled.reverse();
        let len = shuffled.len();
        shuffled.rotate_left((seed as usize) % len);

        let a = builder.build_tree(sorted).unwrap();
        let b = builder.build_tree(shuffled).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_changing_one_file_changes_root(
        files in prop::collection::btree_map("[a-z]{1,8}", prop::collection::vec(any::<u8>(), 0..32), 1..8),
        extra in any::<u8>(),
    ) {
        let store = MemoryObjectStore::new();
        let builder = TreeBuilder::new(&store);
        let before = builder.build_tree(entries_for(&store, &files)).unwrap();

        let mut edited = files.clone();
        if let Some(content) = edited.values_mut().next() {
            content.push(extra);
        }
        let after = builder.build_tree(entries_for(&store, &edited)).unwrap();
        prop_assert_ne!(before, after);
    }
}

#[test]
fn test_duplicate_names_rejected() {
    let store = MemoryObjectStore::new();
    let x = store.put(b"x").unwrap();
    let y = store.put(b"y").unwrap();
    let result = TreeBuilder::new(&store).build_tree(vec![
        TreeEntry::blob("same", x),
        TreeEntry::blob("same", y),
    ]);
    assert!(matches!(result, Err(StorageError::DuplicateEntry(name)) if name == "same"));
}

#[test]
fn test_identical_subtrees_share_one_object() {
    let store = MemoryObjectStore::new();
    let root = BTreeMap::from([
        (
            "left".to_string(),
            WorkingNode::dir([("f.txt", WorkingNode::file("shared"))]),
        ),
        (
            "right".to_string(),
            WorkingNode::dir([("f.txt", WorkingNode::file("shared"))]),
        ),
    ]);
    TreeBuilder::new(&store).build_directory(&root).unwrap();
    // one blob, one shared subtree, one root
    assert_eq!(store.len().unwrap(), 3);
}

#[test]
fn test_scanned_directory_matches_built_description() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::write(root.join("a.txt"), "hello\n").unwrap();
    fs::create_dir_all(root.join("tests")).unwrap();
    fs::write(root.join("tests/b.txt"), "bee\n").unwrap();
    fs::create_dir_all(root.join(".git")).unwrap();
    fs::write(root.join(".git/HEAD"), "ref").unwrap();

    let store = MemoryObjectStore::new();
    let scanned = scan_directory(&store, root, &ScanOptions::default()).unwrap();

    let described = BTreeMap::from([
        ("a.txt".to_string(), WorkingNode::file("hello\n")),
        (
            "tests".to_string(),
            WorkingNode::dir([("b.txt", WorkingNode::file("bee\n"))]),
        ),
    ]);
    let built = TreeBuilder::new(&store).build_directory(&described).unwrap();
    assert_eq!(scanned, built);
}

#[test]
fn test_rescanning_unchanged_directory_is_stable() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("one.txt"), "1").unwrap();
    fs::create_dir_all(temp_dir.path().join("nested/deeper")).unwrap();
    fs::write(temp_dir.path().join("nested/deeper/two.txt"), "2").unwrap();

    let store = MemoryObjectStore::new();
    let first = scan_directory(&store, temp_dir.path(), &ScanOptions::default()).unwrap();
    let objects = store.len().unwrap();
    let second = scan_directory(&store, temp_dir.path(), &ScanOptions::default()).unwrap();

    assert_eq!(first, second);
    assert_eq!(store.len().unwrap(), objects);
}

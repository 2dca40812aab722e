use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use snapstore::history::Snapshot;
use snapstore::tree::WorkingNode;
use snapstore::{Digest, ObjectKind, Repository, StorageError};
use std::collections::BTreeMap;

fn tree_with(repo: &Repository, content: &str) -> Digest {
    let root = BTreeMap::from([("file.txt".to_string(), WorkingNode::file(content))]);
    repo.build_directory(&root).unwrap()
}

#[test]
fn test_head_offsets_after_three_commits() {
    let repo = Repository::in_memory("tester");
    let first = repo.commit_head(tree_with(&repo, "1"), "one").unwrap();
    let second = repo.commit_head(tree_with(&repo, "2"), "two").unwrap();
    let third = repo.commit_head(tree_with(&repo, "3"), "three").unwrap();

    assert_eq!(repo.resolve("HEAD").unwrap(), third);
    assert_eq!(repo.resolve("HEAD~").unwrap(), second);
    assert_eq!(repo.resolve("HEAD~1").unwrap(), second);
    assert_eq!(repo.resolve("HEAD~2").unwrap(), first);
    assert!(matches!(
        repo.resolve("HEAD~3"),
        Err(StorageError::OutOfRange { requested: 3, len: 3 })
    ));
    assert_eq!(repo.resolve(&first.to_hex()).unwrap(), first);
}

#[test]
fn test_resolve_on_empty_history_is_out_of_range() {
    let repo = Repository::in_memory("tester");
    assert!(matches!(
        repo.resolve("HEAD"),
        Err(StorageError::OutOfRange { requested: 0, len: 0 })
    ));
}

#[test]
fn test_malformed_and_unknown_refs() {
    let repo = Repository::in_memory("tester");
    repo.commit_head(tree_with(&repo, "x"), "x").unwrap();

    assert!(matches!(repo.resolve("HEAD~x"), Err(StorageError::InvalidRef(_))));
    assert!(matches!(repo.resolve("main"), Err(StorageError::InvalidRef(_))));
    let unknown = Digest::from_bytes([4; 32]);
    assert!(matches!(
        repo.resolve(&unknown.to_hex()),
        Err(StorageError::NotFound(d)) if d == unknown
    ));
}

#[test]
fn test_same_root_twice_gives_two_snapshots_one_tree() {
    let repo = Repository::in_memory("tester");
    let tree = tree_with(&repo, "same");
    let objects_before = repo.store().len().unwrap();

    let a = repo.commit_head(tree, "first message").unwrap();
    let b = repo.commit_head(tree, "second message").unwrap();

    assert_ne!(a, b);
    assert_eq!(repo.get_tree(&a).unwrap(), tree);
    assert_eq!(repo.get_tree(&b).unwrap(), tree);
    // only the two snapshot objects were added
    assert_eq!(repo.store().len().unwrap(), objects_before + 2);
}

#[test]
fn test_commit_requires_stored_tree() {
    let repo = Repository::in_memory("tester");
    let missing = Digest::from_bytes([2; 32]);
    assert!(matches!(
        repo.commit_head(missing, "nothing"),
        Err(StorageError::NoContent(d)) if d == missing
    ));

    let blob = repo.put(b"not a tree").unwrap();
    assert!(matches!(
        repo.commit(blob, "blob", None),
        Err(StorageError::NoContent(_))
    ));
    assert!(repo.history().is_empty());
}

#[test]
fn test_commit_with_stale_parent_is_rejected() {
    let repo = Repository::in_memory("tester");
    let tree = tree_with(&repo, "t");
    let first = repo.commit(tree, "first", None).unwrap();
    repo.commit(tree, "second", Some(first)).unwrap();

    let result = repo.commit(tree, "stale", Some(first));
    assert!(matches!(result, Err(StorageError::ParentMismatch { .. })));
    assert_eq!(repo.history().len(), 2);
}

#[test]
fn test_log_is_newest_first() {
    let repo = Repository::in_memory("tester");
    let tree = tree_with(&repo, "t");
    for message in ["a", "b", "c"] {
        repo.commit_head(tree, message).unwrap();
    }
    let messages: Vec<String> = repo
        .history()
        .log()
        .unwrap()
        .into_iter()
        .map(|(_, s)| s.message)
        .collect();
    assert_eq!(messages, vec!["c", "b", "a"]);
    assert_eq!(repo.history().verify_chain().unwrap(), 3);
}

#[test]
fn test_concurrent_commits_form_one_linear_chain() {
    let repo = Repository::in_memory("tester");
    let threads = 8;
    let per_thread = 10;

    std::thread::scope(|scope| {
        for t in 0..threads {
            let repo = &repo;
            scope.spawn(move || {
                for i in 0..per_thread {
                    let tree = tree_with(repo, &format!("thread {} commit {}", t, i));
                    repo.commit_head(tree, &format!("{}-{}", t, i)).unwrap();
                }
            });
        }
    });

    assert_eq!(repo.history().len(), threads * per_thread);
    assert_eq!(repo.history().verify_chain().unwrap(), threads * per_thread);
    let first = repo.resolve(&format!("HEAD~{}", threads * per_thread - 1)).unwrap();
    assert_eq!(repo.history().get_snapshot(&first).unwrap().parent, None);
}

#[test]
fn test_commit_of_undecodable_tree_object_fails() {
    let repo = Repository::in_memory("tester");
    let bogus = repo
        .store()
        .put_object(ObjectKind::Tree, b"not a tree")
        .unwrap();

    assert!(matches!(
        repo.commit_head(bogus, "bad"),
        Err(StorageError::NoContent(d)) if d == bogus
    ));
    assert!(repo.history().is_empty());
}

#[test]
fn test_independent_repositories_do_not_share_history() {
    let one = Repository::in_memory("one");
    let two = Repository::in_memory("two");
    one.commit_head(tree_with(&one, "x"), "only in one").unwrap();

    assert_eq!(one.history().len(), 1);
    assert!(two.history().is_empty());
}

fn parent_snapshot() -> Snapshot {
    Snapshot {
        root: Digest::from_bytes([1; 32]),
        parent: None,
        author: "alice".to_string(),
        message: "base".to_string(),
        timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
    }
}

fn child_of(parent: &Snapshot) -> Snapshot {
    Snapshot {
        root: Digest::from_bytes([2; 32]),
        parent: Some(parent.id()),
        author: "bob".to_string(),
        message: "child".to_string(),
        timestamp: Utc.timestamp_opt(1_700_000_100, 0).unwrap(),
    }
}

proptest! {
    #[test]
    fn prop_any_parent_field_change_changes_child_id(
        field in 0usize..5,
        byte in 1u8..=255,
        text in "[a-z]{1,10}",
        secs in 0i64..4_000_000_000,
    ) {
        let original = parent_snapshot();
        let mut tampered = original.clone();
        match field {
            0 => tampered.root = Digest::from_bytes([byte; 32]),
            1 => tampered.parent = Some(Digest::from_bytes([byte; 32])),
            2 => tampered.author = format!("{}-{}", original.author, text),
            3 => tampered.message = format!("{}-{}", original.message, text),
            _ => {
                prop_assume!(secs != 1_700_000_000);
                tampered.timestamp = Utc.timestamp_opt(secs, 0).unwrap();
            }
        }
        prop_assume!(field != 0 || byte != 1);

        prop_assert_ne!(child_of(&original).id(), child_of(&tampered).id());
    }
}

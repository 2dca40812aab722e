use snapstore::config::{ConfigLoader, StorageBackend};
use snapstore::Repository;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_explicit_file_overrides_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("custom.toml");
    fs::write(
        &path,
        r#"
author = "ci-bot"

[storage]
backend = "memory"
ignore = [".git", "target"]

[logging]
level = "debug"
format = "json"
"#,
    )
    .unwrap();

    let config = ConfigLoader::load_from_file(&path).unwrap();
    if std::env::var("SNAPSTORE__AUTHOR").is_err() {
        assert_eq!(config.author, "ci-bot");
    }
    assert_eq!(config.storage.backend, StorageBackend::Memory);
    assert_eq!(config.storage.ignore, vec![".git", "target"]);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "json");
}

#[test]
fn test_root_file_sets_relative_store_path() {
    let root = TempDir::new().unwrap();
    fs::write(
        root.path().join("snapstore.toml"),
        "[storage]\npath = \".snapstore\"\n",
    )
    .unwrap();

    let config = ConfigLoader::load(root.path()).unwrap();
    if std::env::var("SNAPSTORE__STORAGE__PATH").is_err() {
        assert_eq!(config.storage.path, Some(PathBuf::from(".snapstore")));
        assert_eq!(
            config.storage.resolve_path(Some(root.path())).unwrap(),
            root.path().join(".snapstore")
        );
    }
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    assert!(ConfigLoader::load_from_file(&temp_dir.path().join("absent.toml")).is_err());
}

#[test]
fn test_configured_repository_records_author() {
    let root = TempDir::new().unwrap();
    fs::write(
        root.path().join("snapstore.toml"),
        "author = \"configured\"\n\n[storage]\npath = \"store\"\n",
    )
    .unwrap();
    fs::write(root.path().join("file.txt"), "data").unwrap();

    let config = ConfigLoader::load(root.path()).unwrap();
    let repo = Repository::open(&config, Some(root.path())).unwrap();
    let id = repo.snapshot_dir(root.path(), "configured snapshot").unwrap();

    let snapshot = repo.history().get_snapshot(&id).unwrap();
    if std::env::var("SNAPSTORE__AUTHOR").is_err() {
        assert_eq!(snapshot.author, "configured");
    }
    let files = repo.manifest(&snapshot.root).unwrap();
    assert!(files.contains_key("file.txt"));
    assert!(files.contains_key("snapstore.toml"));
    assert!(!files.keys().any(|p| p.starts_with("store")));
}

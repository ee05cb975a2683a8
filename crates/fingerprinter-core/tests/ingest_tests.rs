use std::fs;
use std::path::Path;
use tempfile::tempdir;

use fingerprinter_core::hasher::hash_bytes;
use fingerprinter_core::storage::Database;
use fingerprinter_core::{ingest, manual_update, Error, IgnoreRules, SilentReporter};

/// Layout:
///   release/
///     index.php          ("<?php // v1")
///     release/app.js     ("app v1")      ← nested dir shares the root's name
///     readme.txt         ("read me")     ← ignored by *.txt
fn create_release_tree(root: &Path) {
    fs::create_dir_all(root.join("release")).unwrap();
    fs::write(root.join("index.php"), "<?php // v1").unwrap();
    fs::write(root.join("release/app.js"), "app v1").unwrap();
    fs::write(root.join("readme.txt"), "read me").unwrap();
}

#[test]
fn test_ingest_creates_fingerprints_and_removes_tree() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("release");
    create_release_tree(&root);

    let db = Database::open_in_memory().unwrap();
    let ignore = IgnoreRules::new(&["*.txt"]).unwrap();
    let outcome = ingest(&db, "1.0", &root, &ignore, &SilentReporter).unwrap();

    assert_eq!(outcome.fingerprints, 2);
    assert_eq!(outcome.version.number, "1.0");
    assert_eq!(db.list_versions().unwrap().len(), 1);
    assert_eq!(db.fingerprint_count().unwrap(), 2);

    let entries = db.fingerprints_of(outcome.version.id).unwrap();
    let rows: Vec<(&str, &str)> = entries
        .iter()
        .map(|e| (e.path.as_str(), e.hash.as_str()))
        .collect();
    let index_hash = hash_bytes(b"<?php // v1");
    let app_hash = hash_bytes(b"app v1");
    assert_eq!(
        rows,
        vec![
            ("/index.php", index_hash.as_str()),
            ("/release/app.js", app_hash.as_str()),
        ]
    );

    assert!(!root.exists(), "release tree should be removed after ingestion");
}

#[test]
fn test_ingest_reuses_paths_across_versions() {
    let tmp = tempdir().unwrap();
    let db = Database::open_in_memory().unwrap();
    let ignore = IgnoreRules::default();

    for (number, content) in [("1.0", "one"), ("1.1", "two")] {
        let root = tmp.path().join(number);
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("app.js"), content).unwrap();
        ingest(&db, number, &root, &ignore, &SilentReporter).unwrap();
    }

    assert_eq!(db.path_count().unwrap(), 1);
    assert_eq!(db.fingerprint_count().unwrap(), 2);
}

#[test]
fn test_ingest_duplicate_version_leaves_tree() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("release");
    create_release_tree(&root);

    let db = Database::open_in_memory().unwrap();
    db.create_version("1.0").unwrap();

    let result = ingest(&db, "1.0", &root, &IgnoreRules::default(), &SilentReporter);
    assert!(matches!(result, Err(Error::DuplicateVersion(_))));
    assert!(root.exists());
    assert_eq!(db.fingerprint_count().unwrap(), 0);
}

#[test]
fn test_ingest_missing_tree_writes_nothing() {
    let tmp = tempdir().unwrap();
    let db = Database::open_in_memory().unwrap();

    let result = ingest(
        &db,
        "1.0",
        &tmp.path().join("absent"),
        &IgnoreRules::default(),
        &SilentReporter,
    );
    assert!(result.is_err());
    assert!(db.find_version("1.0").unwrap().is_none());
}

#[cfg(unix)]
#[test]
fn test_ingest_failure_rolls_back_version() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = tempdir().unwrap();
    let root = tmp.path().join("release");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("a.js"), "a").unwrap();
    let locked = root.join("b.js");
    fs::write(&locked, "b").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Root ignores file permissions; nothing to test in that case.
    if fs::read(&locked).is_ok() {
        return;
    }

    let db = Database::open_in_memory().unwrap();
    let result = ingest(&db, "1.0", &root, &IgnoreRules::default(), &SilentReporter);
    assert!(result.is_err());
    assert!(db.find_version("1.0").unwrap().is_none());
    assert_eq!(db.fingerprint_count().unwrap(), 0);
    assert!(root.exists());

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
}

#[test]
fn test_manual_update_requires_version() {
    let tmp = tempdir().unwrap();
    let db = Database::open_in_memory().unwrap();

    let result = manual_update(
        &db,
        None,
        tmp.path(),
        &IgnoreRules::default(),
        &SilentReporter,
    );
    match result {
        Err(Error::MissingOption(option)) => assert_eq!(option, "--version"),
        other => panic!("expected MissingOption, got {:?}", other),
    }
}

#[test]
fn test_manual_update_skips_known_version() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("release");
    create_release_tree(&root);

    let db = Database::open_in_memory().unwrap();
    let ignore = IgnoreRules::default();
    let first = manual_update(&db, Some("2.0"), &root, &ignore, &SilentReporter).unwrap();
    assert_eq!(first.unwrap().fingerprints, 3);

    create_release_tree(&root);
    let second = manual_update(&db, Some("2.0"), &root, &ignore, &SilentReporter).unwrap();
    assert!(second.is_none());
    assert_eq!(db.fingerprint_count().unwrap(), 3);
}

use std::fs;
use std::path::PathBuf;

use sift::{SiftError, SymbolMap, TemporaryStorage};

// ---------------------------------------------------------------------------
// Temporary storage
// ---------------------------------------------------------------------------

fn plant(storage: &TemporaryStorage, work: &tempfile::TempDir, content: &str) -> String {
    let source = work.path().join(format!("src-{content}.bin"));
    fs::write(&source, content).unwrap();
    storage.add(&source).unwrap()
}

fn age(path: &std::path::Path, seconds: i64) {
    let then = filetime::FileTime::from_unix_time(
        filetime::FileTime::now().unix_seconds() - seconds,
        0,
    );
    filetime::set_file_mtime(path, then).unwrap();
}

#[test]
fn add_moves_the_file_under_a_token() {
    let work = tempfile::tempdir().unwrap();
    let store_dir = tempfile::tempdir().unwrap();
    let storage = TemporaryStorage::new("secret", store_dir.path(), 0, 0).unwrap();

    let source = work.path().join("upload.bin");
    fs::write(&source, "payload").unwrap();

    let token = storage.add(&source).unwrap();
    let stored = storage.path_for(&token);

    assert!(!source.exists(), "source must be moved, not copied");
    assert!(stored.exists());
    assert_eq!(fs::read_to_string(&stored).unwrap(), "payload");
}

#[test]
fn path_for_is_pure_and_keyed_by_secret() {
    let store_dir = tempfile::tempdir().unwrap();
    let a = TemporaryStorage::new("alpha", store_dir.path(), 0, 0).unwrap();
    let b = TemporaryStorage::new("beta", store_dir.path(), 0, 0).unwrap();

    assert_eq!(a.path_for("token"), a.path_for("token"));
    assert_ne!(a.path_for("token"), b.path_for("token"));
    assert_ne!(a.path_for("token"), a.path_for("other"));

    // Two shard levels between the base directory and the leaf.
    let leaf = a.path_for("token");
    let relative = leaf.strip_prefix(store_dir.path()).unwrap();
    assert_eq!(relative.components().count(), 3);
}

#[test]
fn prune_removes_entries_past_their_ttl() {
    let work = tempfile::tempdir().unwrap();
    let store_dir = tempfile::tempdir().unwrap();
    let storage = TemporaryStorage::new("secret", store_dir.path(), 0, 1000).unwrap();

    let stale = plant(&storage, &work, "stale");
    let fresh = plant(&storage, &work, "fresh");
    age(&storage.path_for(&stale), 5000);

    assert!(storage.prune().unwrap());
    assert!(!storage.path_for(&stale).exists());
    assert!(storage.path_for(&fresh).exists());

    assert!(!storage.prune().unwrap(), "nothing left to prune");
}

/// Write a payload directly at a token's storage path, bypassing the
/// pruning that `add` performs.
fn plant_at(storage: &TemporaryStorage, token: &str, content: &str) {
    let path = storage.path_for(token);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
}

#[test]
fn prune_evicts_oldest_first_when_over_the_size_cap() {
    let store_dir = tempfile::tempdir().unwrap();
    // Each payload below is 6 bytes; cap allows one of them.
    let storage = TemporaryStorage::new("secret", store_dir.path(), 10, 0).unwrap();

    let (oldest, middle, newest) = ("t-old", "t-mid", "t-new");
    plant_at(&storage, oldest, "aaaaaa");
    plant_at(&storage, middle, "bbbbbb");
    plant_at(&storage, newest, "cccccc");
    age(&storage.path_for(oldest), 300);
    age(&storage.path_for(middle), 200);
    age(&storage.path_for(newest), 100);

    assert!(storage.prune().unwrap());
    assert!(!storage.path_for(oldest).exists());
    assert!(!storage.path_for(middle).exists());
    assert!(storage.path_for(newest).exists());
}

#[test]
fn zero_limits_disable_pruning() {
    let work = tempfile::tempdir().unwrap();
    let store_dir = tempfile::tempdir().unwrap();
    let storage = TemporaryStorage::new("secret", store_dir.path(), 0, 0).unwrap();

    let token = plant(&storage, &work, "kept forever");
    age(&storage.path_for(&token), 1_000_000);

    assert!(!storage.prune().unwrap());
    assert!(storage.path_for(&token).exists());
}

// ---------------------------------------------------------------------------
// Symbol map
// ---------------------------------------------------------------------------

#[test]
fn symbol_map_records_declarations() {
    let dir = tempfile::tempdir().unwrap();
    let lib = dir.path().join("lib.rs");
    fs::write(
        &lib,
        "pub struct Widget;\n\npub fn render() {}\n\nenum Shade { Light, Dark }\n",
    )
    .unwrap();
    let util = dir.path().join("util.rs");
    fs::write(&util, "pub(crate) trait Painter {}\nfn helper() {}\n").unwrap();

    let map = SymbolMap::from_dir(dir.path()).unwrap();
    assert_eq!(map.get("Widget"), Some(lib.as_path()));
    assert_eq!(map.get("render"), Some(lib.as_path()));
    assert_eq!(map.get("Shade"), Some(lib.as_path()));
    assert_eq!(map.get("Painter"), Some(util.as_path()));
    assert_eq!(map.get("helper"), Some(util.as_path()));
    assert_eq!(map.get("missing"), None);
    assert_eq!(map.len(), 5);
}

#[test]
fn later_declarations_overwrite_earlier_ones() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("first.rs");
    fs::write(&first, "pub struct Shared;\n").unwrap();
    let second = dir.path().join("second.rs");
    fs::write(&second, "pub struct Shared;\n").unwrap();

    let map =
        SymbolMap::from_paths(vec![first.clone(), second.clone()]).unwrap();
    assert_eq!(map.get("Shared"), Some(second.as_path()));

    let map = SymbolMap::from_paths(vec![second, first.clone()]).unwrap();
    assert_eq!(map.get("Shared"), Some(first.as_path()));
}

#[test]
fn symbol_map_requires_a_capture_group() {
    let pattern = regex::Regex::new("struct").unwrap();
    let err =
        SymbolMap::from_paths_with_pattern(Vec::<PathBuf>::new(), &pattern).unwrap_err();
    assert!(matches!(err, SiftError::Parse { .. }));
}

#[test]
fn unreadable_sources_surface_io_errors() {
    let err =
        SymbolMap::from_paths(vec![PathBuf::from("/no/such/file.rs")]).unwrap_err();
    assert!(matches!(err, SiftError::Io { .. }));
}

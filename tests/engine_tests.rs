//! Tests for Engine
//!
//! These tests verify:
//! - Save: id assignment, timestamps, one file per record
//! - Find: point lookups, filters, bulk scans
//! - Delete: by id, by fields, delete-all
//! - Payload formats and engine configuration
//! - Concurrent bulk finds over a shared engine

use std::fs;
use std::sync::Arc;
use std::thread;

use filedex::index::is_hidden;
use filedex::storage::RootDir;
use filedex::{Config, Document, Engine, FiledexError, IndexKey, Meta, PayloadFormat};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

// =============================================================================
// Record Types
// =============================================================================

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct User {
    meta: Meta,
    username: String,
    password: String,
    age: u32,
    admin: bool,
}

impl Document for User {}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct Note {
    meta: Meta,
    title: String,
}

impl Document for Note {}

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_engine() -> (TempDir, Engine) {
    setup_with_format(PayloadFormat::Json)
}

fn setup_with_format(format: PayloadFormat) -> (TempDir, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .payload_format(format)
        .find_workers(4)
        .build();
    let mut engine = Engine::open(config).unwrap();
    engine
        .register(&User::default(), &["password", "username", "age", "admin"])
        .unwrap();
    (temp_dir, engine)
}

fn user(username: &str, password: &str) -> User {
    User {
        username: username.to_string(),
        password: password.to_string(),
        ..Default::default()
    }
}

fn record_files(temp: &TempDir, type_name: &str) -> Vec<String> {
    let dir = temp.path().join(RootDir::collection_dir_name(type_name));
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| !is_hidden(name))
        .collect();
    names.sort();
    names
}

fn hex_of(s: &str) -> String {
    s.bytes().map(|b| format!("{:02x}", b)).collect()
}

// =============================================================================
// Open Tests
// =============================================================================

#[test]
fn test_open_creates_root_and_marker() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("mydb");

    let engine = Engine::open(Config::builder().data_dir(&data_dir).build()).unwrap();

    assert_eq!(engine.data_dir(), data_dir.as_path());
    assert_eq!(engine.config().payload_format, PayloadFormat::Json);
    assert!(data_dir.is_dir());
    assert!(data_dir.join(".initCheck").exists());
}

#[test]
fn test_open_missing_dir_without_create() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path().join("absent"))
        .create_if_missing(false)
        .build();

    assert!(matches!(Engine::open(config), Err(FiledexError::Config(_))));
}

#[test]
fn test_open_rejects_zero_workers() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp_dir.path())
        .find_workers(0)
        .build();

    assert!(matches!(Engine::open(config), Err(FiledexError::Config(_))));
}

// =============================================================================
// Registration Guard Tests
// =============================================================================

#[test]
fn test_operations_on_unregistered_type() {
    let (_temp, engine) = setup_temp_engine();

    let mut note = Note::default();
    assert!(matches!(engine.save(&mut note), Err(FiledexError::NotRegistered(_))));
    assert!(matches!(engine.find_one::<Note>(&[]), Err(FiledexError::NotRegistered(_))));
    assert!(matches!(engine.find_all::<Note>(&[]), Err(FiledexError::NotRegistered(_))));
    assert!(matches!(engine.delete(&note), Err(FiledexError::NotRegistered(_))));

    // Nothing was assigned
    assert!(note.meta.id.is_empty());
}

// =============================================================================
// Save Tests
// =============================================================================

#[test]
fn test_save_assigns_id_and_timestamps() {
    let (_temp, engine) = setup_temp_engine();

    let mut root = user("root", "secret");
    engine.save(&mut root).unwrap();

    assert!(root.meta.is_persisted());
    assert!(uuid::Uuid::parse_str(&root.meta.id).is_ok());
    assert_eq!(root.meta.created_at, root.meta.updated_at);
    assert!(root.meta.created_at.timestamp() > 0);
}

#[test]
fn test_save_filename_layout() {
    let (temp, engine) = setup_temp_engine();

    let mut root = user("root", "secret");
    engine.save(&mut root).unwrap();

    let expected = format!(
        "password={}=password:username={}=username:age={}=age:admin={}=admin:meta.id={}=meta.id",
        hex_of("secret"),
        hex_of("root"),
        hex_of("0"),
        hex_of("false"),
        hex_of(&root.meta.id)
    );
    assert_eq!(record_files(&temp, "User"), vec![expected]);
}

#[test]
fn test_save_twice_keeps_id() {
    let (_temp, engine) = setup_temp_engine();

    let mut root = user("root", "secret");
    engine.save(&mut root).unwrap();
    let id = root.meta.id.clone();
    let created = root.meta.created_at;

    root.password = "changed".to_string();
    engine.save(&mut root).unwrap();

    assert_eq!(root.meta.id, id);
    assert_eq!(root.meta.created_at, created);
    assert!(root.meta.updated_at >= created);
}

#[test]
fn test_save_updates_leave_one_file() {
    let (temp, engine) = setup_temp_engine();

    let mut root = user("root", "secret");
    for age in 0..5 {
        root.age = age;
        engine.save(&mut root).unwrap();
    }

    let files = record_files(&temp, "User");
    assert_eq!(files.len(), 1);
    assert!(files[0].contains(&format!("age={}=age", hex_of("4"))));
    assert_eq!(engine.count::<User>().unwrap(), 1);
}

#[test]
fn test_save_with_preset_id_is_update() {
    let (_temp, engine) = setup_temp_engine();

    let mut given = user("root", "secret");
    given.meta.id = "fixed-id".to_string();
    engine.save(&mut given).unwrap();

    assert_eq!(given.meta.id, "fixed-id");
    let found: User = engine.find_one(&[IndexKey::id("fixed-id")]).unwrap();
    assert_eq!(found.username, "root");
}

#[test]
fn test_save_update_too_long_keeps_old_record() {
    let (temp, engine) = setup_temp_engine();

    let mut root = user("root", "secret");
    engine.save(&mut root).unwrap();
    let id = root.meta.id.clone();

    root.username = "x".repeat(100);
    let err = engine.save(&mut root).unwrap_err();
    assert!(matches!(err, FiledexError::FilenameTooLong { max: 255, .. }));

    // The previous version is untouched and no temp file is left behind
    let found: User = engine.find_one(&[IndexKey::id(&id)]).unwrap();
    assert_eq!(found.username, "root");
    assert_eq!(engine.count::<User>().unwrap(), 1);

    let dir = temp.path().join(RootDir::collection_dir_name("User"));
    assert_eq!(fs::read_dir(dir).unwrap().count(), 2); // .info + record
}

#[test]
fn test_save_new_too_long_writes_nothing() {
    let (temp, engine) = setup_temp_engine();

    let mut long = user(&"y".repeat(200), "secret");
    assert!(matches!(
        engine.save(&mut long),
        Err(FiledexError::FilenameTooLong { .. })
    ));

    assert!(record_files(&temp, "User").is_empty());
    let dir = temp.path().join(RootDir::collection_dir_name("User"));
    assert_eq!(fs::read_dir(dir).unwrap().count(), 1); // .info
}

// =============================================================================
// Find Tests
// =============================================================================

#[test]
fn test_find_by_id_round_trip() {
    let (_temp, engine) = setup_temp_engine();

    let mut root = user("root", "secret");
    root.age = 33;
    root.admin = true;
    engine.save(&mut root).unwrap();

    let found: User = engine.find_one(&[IndexKey::id(&root.meta.id)]).unwrap();
    assert_eq!(found, root);
}

#[test]
fn test_find_one_no_match() {
    let (_temp, engine) = setup_temp_engine();

    engine.save(&mut user("root", "secret")).unwrap();

    let err = engine
        .find_one::<User>(&[IndexKey::new("username").value("nobody")])
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_find_one_empty_collection() {
    let (_temp, engine) = setup_temp_engine();
    let err = engine.find_one::<User>(&[]).unwrap_err();
    assert!(matches!(err, FiledexError::NoDocumentFound));
}

#[test]
fn test_find_all_empty_collection() {
    let (_temp, engine) = setup_temp_engine();
    let users: Vec<User> = engine.find_all(&[]).unwrap();
    assert!(users.is_empty());
}

#[test]
fn test_find_all_with_filter() {
    let (_temp, engine) = setup_temp_engine();

    engine.save(&mut user("alice", "shared")).unwrap();
    engine.save(&mut user("bob", "shared")).unwrap();
    engine.save(&mut user("carol", "other")).unwrap();

    let mut shared: Vec<User> = engine
        .find_all(&[IndexKey::new("password").value("shared")])
        .unwrap();
    shared.sort_by(|a, b| a.username.cmp(&b.username));

    let names: Vec<&str> = shared.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, vec!["alice", "bob"]);
}

#[test]
fn test_find_all_filters_are_anded() {
    let (_temp, engine) = setup_temp_engine();

    engine.save(&mut user("alice", "shared")).unwrap();
    engine.save(&mut user("bob", "shared")).unwrap();

    let found: Vec<User> = engine
        .find_all(&[
            IndexKey::new("password").value("shared"),
            IndexKey::new("username").value("bob"),
        ])
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].username, "bob");
}

#[test]
fn test_find_integer_filter() {
    let (_temp, engine) = setup_temp_engine();

    let mut old = user("old", "x");
    old.age = 70;
    engine.save(&mut old).unwrap();
    engine.save(&mut user("young", "x")).unwrap();

    // Any integer width encodes the same way
    let found: User = engine.find_one(&[IndexKey::new("age").value(70u8)]).unwrap();
    assert_eq!(found.username, "old");
    let found: User = engine.find_one(&[IndexKey::new("age").value(70i64)]).unwrap();
    assert_eq!(found.username, "old");
}

#[test]
fn test_find_empty_string_filter_is_ignored() {
    let (_temp, engine) = setup_temp_engine();

    engine.save(&mut user("alice", "a")).unwrap();
    engine.save(&mut user("bob", "b")).unwrap();

    let unfiltered: Vec<User> = engine.find_all(&[]).unwrap();
    let empty: Vec<User> = engine
        .find_all(&[IndexKey::new("username").value("")])
        .unwrap();
    let unset: Vec<User> = engine.find_all(&[IndexKey::new("username")]).unwrap();

    assert_eq!(unfiltered.len(), 2);
    assert_eq!(empty.len(), 2);
    assert_eq!(unset.len(), 2);
}

#[test]
fn test_find_false_and_zero_filters_are_ignored() {
    let (_temp, engine) = setup_temp_engine();

    let mut admin = user("admin", "a");
    admin.admin = true;
    admin.age = 40;
    engine.save(&mut admin).unwrap();
    engine.save(&mut user("guest", "g")).unwrap();

    // false / 0 cannot be searched for: they match everything
    let not_admin: Vec<User> = engine
        .find_all(&[IndexKey::new("admin").value(false)])
        .unwrap();
    assert_eq!(not_admin.len(), 2);

    let zero_age: Vec<User> = engine.find_all(&[IndexKey::new("age").value(0u32)]).unwrap();
    assert_eq!(zero_age.len(), 2);

    // true / non-zero do filter
    let admins: Vec<User> = engine
        .find_all(&[IndexKey::new("admin").value(true)])
        .unwrap();
    assert_eq!(admins.len(), 1);
    assert_eq!(admins[0].username, "admin");
}

#[test]
fn test_find_all_follows_listing_order() {
    let (temp, engine) = setup_temp_engine();

    for i in 0..20 {
        engine.save(&mut user(&format!("user{:02}", i), "pw")).unwrap();
    }

    let dir = temp.path().join(RootDir::collection_dir_name("User"));
    let listing: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| !is_hidden(name))
        .collect();

    let users: Vec<User> = engine.find_all(&[]).unwrap();
    let ids: Vec<&str> = users.iter().map(|u| u.meta.id.as_str()).collect();
    let expected: Vec<&str> = listing
        .iter()
        .map(|name| name.rsplit(':').next().unwrap())
        .map(|token| token.trim_start_matches("meta.id=").trim_end_matches("=meta.id"))
        .collect();

    let decoded: Vec<String> = expected
        .iter()
        .map(|hex| String::from_utf8(hex::decode(hex).unwrap()).unwrap())
        .collect();
    assert_eq!(ids, decoded);
}

#[test]
fn test_find_all_skips_hidden_entries() {
    let (temp, engine) = setup_temp_engine();

    engine.save(&mut user("alice", "a")).unwrap();
    let dir = temp.path().join(RootDir::collection_dir_name("User"));
    fs::write(dir.join(".scratch"), b"not a record").unwrap();

    let users: Vec<User> = engine.find_all(&[]).unwrap();
    assert_eq!(users.len(), 1);
}

#[cfg(unix)]
#[test]
fn test_find_skips_non_utf8_entries() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let (temp, engine) = setup_temp_engine();

    engine.save(&mut user("alice", "a")).unwrap();
    let dir = temp.path().join(RootDir::collection_dir_name("User"));
    fs::write(dir.join(OsStr::from_bytes(b"stray\xff\xfe")), b"junk").unwrap();

    assert_eq!(engine.count::<User>().unwrap(), 1);
    let found: User = engine.find_one(&[]).unwrap();
    assert_eq!(found.username, "alice");
    let users: Vec<User> = engine.find_all(&[]).unwrap();
    assert_eq!(users.len(), 1);
}

#[test]
fn test_find_all_reports_corrupt_payload() {
    let (temp, engine) = setup_temp_engine();

    let dir = temp.path().join(RootDir::collection_dir_name("User"));
    fs::write(dir.join("username==username:meta.id==meta.id"), b"{broken").unwrap();

    let err = engine.find_all::<User>(&[]).unwrap_err();
    assert!(matches!(err, FiledexError::Serialization(_)));
}

#[test]
fn test_collections_are_isolated() {
    let (_temp, mut engine) = setup_temp_engine();
    engine.register(&Note::default(), &["title"]).unwrap();

    engine.save(&mut user("alice", "a")).unwrap();
    let mut note = Note {
        title: "hello".to_string(),
        ..Default::default()
    };
    engine.save(&mut note).unwrap();

    assert_eq!(engine.find_all::<User>(&[]).unwrap().len(), 1);
    assert_eq!(engine.find_all::<Note>(&[]).unwrap().len(), 1);
    assert_eq!(engine.count::<Note>().unwrap(), 1);
}

// =============================================================================
// Delete Tests
// =============================================================================

#[test]
fn test_delete_all_with_empty_template() {
    let (temp, engine) = setup_temp_engine();

    for name in ["a", "b", "c"] {
        engine.save(&mut user(name, "pw")).unwrap();
    }

    let removed = engine.delete(&User::default()).unwrap();
    assert_eq!(removed, 3);
    assert!(record_files(&temp, "User").is_empty());

    // Metadata survives
    let dir = temp.path().join(RootDir::collection_dir_name("User"));
    assert!(dir.join(".info").exists());
}

#[test]
fn test_delete_by_id_removes_one() {
    let (temp, engine) = setup_temp_engine();

    let mut first = user("alice", "shared");
    let mut second = user("bob", "shared");
    engine.save(&mut first).unwrap();
    engine.save(&mut second).unwrap();

    // Only the id is looked at, the other fields are ignored
    let mut template = user("bob", "shared");
    template.meta.id = first.meta.id.clone();
    assert_eq!(engine.delete(&template).unwrap(), 1);

    let remaining: Vec<User> = engine.find_all(&[]).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].meta.id, second.meta.id);
    assert_eq!(record_files(&temp, "User").len(), 1);
}

#[test]
fn test_delete_by_shared_field_removes_all_matches() {
    let (_temp, engine) = setup_temp_engine();

    engine.save(&mut user("alice", "shared")).unwrap();
    engine.save(&mut user("bob", "shared")).unwrap();
    engine.save(&mut user("carol", "other")).unwrap();

    let template = User {
        password: "shared".to_string(),
        ..Default::default()
    };
    assert_eq!(engine.delete(&template).unwrap(), 2);

    let remaining: Vec<User> = engine.find_all(&[]).unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].username, "carol");
}

#[test]
fn test_delete_no_match() {
    let (_temp, engine) = setup_temp_engine();
    engine.save(&mut user("alice", "a")).unwrap();

    let mut template = User::default();
    template.meta.id = "missing".to_string();
    assert_eq!(engine.delete(&template).unwrap(), 0);
    assert_eq!(engine.count::<User>().unwrap(), 1);
}

// =============================================================================
// Payload Format Tests
// =============================================================================

#[test]
fn test_bincode_round_trip() {
    let (_temp, engine) = setup_with_format(PayloadFormat::Bincode);

    let mut root = user("root", "secret");
    root.age = 7;
    engine.save(&mut root).unwrap();

    let found: User = engine.find_one(&[IndexKey::id(&root.meta.id)]).unwrap();
    assert_eq!(found, root);
    let all: Vec<User> = engine.find_all(&[]).unwrap();
    assert_eq!(all, vec![root]);
}

#[test]
fn test_pretty_json_is_readable() {
    let (temp, engine) = setup_with_format(PayloadFormat::JsonPretty);

    engine.save(&mut user("root", "secret")).unwrap();

    let dir = temp.path().join(RootDir::collection_dir_name("User"));
    let name = &record_files(&temp, "User")[0];
    let text = fs::read_to_string(dir.join(name)).unwrap();
    assert!(text.contains("\n  \"username\": \"root\""));
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_find_all() {
    let (_temp, engine) = setup_temp_engine();

    for i in 0..50 {
        let mut u = user(&format!("user{}", i), if i % 2 == 0 { "even" } else { "odd" });
        engine.save(&mut u).unwrap();
    }

    let engine = Arc::new(engine);
    let mut handles = vec![];

    for _ in 0..8 {
        let engine = Arc::clone(&engine);
        handles.push(thread::spawn(move || {
            let even: Vec<User> = engine
                .find_all(&[IndexKey::new("password").value("even")])
                .unwrap();
            assert_eq!(even.len(), 25);
            assert!(even.iter().all(|u| u.password == "even"));
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

//! Tests for session lifecycle and its stores.

use agenda_client::{FileStore, KeyValueStore, MemoryStore, SessionManager};
use agenda_engine::account::{User, UserType};

fn user() -> User {
    User {
        id: "u1".to_string(),
        email: "ana@example.com".to_string(),
        name: "Ana".to_string(),
        phone: None,
        user_type: UserType::Client,
        active: true,
        professional: None,
    }
}

#[test]
fn issue_then_invalidate() {
    let mut session = SessionManager::new(MemoryStore::new());
    assert!(!session.is_authenticated());

    session.issue("tok".to_string(), user()).unwrap();
    assert!(session.is_authenticated());
    assert_eq!(session.token(), Some("tok"));
    assert_eq!(session.user().map(|u| u.name.as_str()), Some("Ana"));

    session.invalidate();
    assert!(!session.is_authenticated());
    assert_eq!(session.store().get("token"), None);
}

#[test]
fn file_store_restores_session_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("session.json");

    let mut session = SessionManager::new(FileStore::open(&path).unwrap());
    session.issue("tok".to_string(), user()).unwrap();
    drop(session);

    let restored = SessionManager::new(FileStore::open(&path).unwrap());
    assert!(restored.is_authenticated());
    assert_eq!(restored.user(), Some(&user()));
}

#[test]
fn token_without_user_is_dropped() {
    let mut store = MemoryStore::new();
    store.set("token", "orphan").unwrap();

    let session = SessionManager::new(store);
    assert!(!session.is_authenticated());
    assert_eq!(session.token(), None);
    assert_eq!(session.store().get("token"), None);
}

#[test]
fn unreadable_user_is_discarded() {
    let mut store = MemoryStore::new();
    store.set("token", "tok").unwrap();
    store.set("user", "{not json").unwrap();

    let session = SessionManager::new(store);
    assert!(!session.is_authenticated());
}

#[test]
fn corrupt_file_is_a_store_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "[1, 2").unwrap();
    assert!(FileStore::open(&path).is_err());
}

#[test]
fn missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path().join("absent.json")).unwrap();
    assert_eq!(store.get("token"), None);
}

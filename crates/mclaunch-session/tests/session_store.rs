//! Integration tests for the session store through the public API only.

use std::fs;

use mclaunch_session::{AUTH_FILE_NAME, SessionStore, StoreError, redact};

#[test]
fn test_store_sees_sessions_written_after_creation() {
    // The launcher writes the document while we hold the store; every call
    // must re-read it.
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path());
    assert!(matches!(
        store.lookup("steve.builder@example.com"),
        Err(StoreError::Unavailable { .. })
    ));

    fs::write(
        dir.path().join(AUTH_FILE_NAME),
        r#"{"microsoft":{"sessions":{"steve.builder@example.com":{"username":"Steve","uuid":"abc"}}}}"#,
    )
    .unwrap();

    let record = store
        .lookup("steve.builder@example.com")
        .expect("document now exists")
        .expect("steve now cached");
    assert_eq!(record.username, "Steve");
}

#[test]
fn test_list_entries_use_the_public_redactor() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(AUTH_FILE_NAME),
        r#"{"microsoft":{"sessions":{"steve.builder@example.com":{"username":"Steve","uuid":"abc"}}}}"#,
    )
    .unwrap();
    let store = SessionStore::new(dir.path());

    let entry = store.list_all().next().expect("one entry");

    assert_eq!(entry.email_safe, redact("steve.builder@example.com"));
    assert_eq!(entry.email_safe, "ste***@xample.com");
}

#[test]
fn test_store_path_points_into_main_dir() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path());

    assert_eq!(store.path(), dir.path().join(AUTH_FILE_NAME));
}

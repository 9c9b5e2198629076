//! End-to-end store scenarios: create, re-fetch, fork, and list a user's
//! loops through the public crate API.

use codeloop::data::{Database, Language, LoopDraft, LoopStore};

fn setup_store() -> (tempfile::TempDir, Database, LoopStore) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("codeloop.db")).unwrap();
    let store = LoopStore::new(db.connection());
    (dir, db, store)
}

#[test]
fn hello_world_then_fork_scenario() {
    let (_dir, _db, store) = setup_store();

    // Create the root loop
    let root = store
        .create(&LoopDraft::new(
            "u1",
            "Write a hello world",
            Language::Python,
            "print('hello')",
        ))
        .unwrap();

    // Re-fetch returns the same four fields plus generated id/created_at
    let fetched = store.get_by_id(root.id).unwrap().unwrap();
    assert_eq!(fetched.user_id, "u1");
    assert_eq!(fetched.prompt, "Write a hello world");
    assert_eq!(fetched.language, Language::Python);
    assert_eq!(fetched.code, "print('hello')");
    assert!(!fetched.id.is_nil());

    // Fork: the new record points back at the root
    let fork = store
        .create(&root.fork_seed().into_draft(
            "u1",
            "Add a greeting name",
            Language::Python,
            "print(f'hello {name}')",
        ))
        .unwrap();
    assert_eq!(fork.parent_loop_id, Some(root.id));
    assert_ne!(fork.id, root.id);

    // The root is unchanged by the fork
    assert_eq!(store.get_by_id(root.id).unwrap().unwrap(), root);

    // Both appear in the owner listing, most recent first
    let loops = store.list_by_owner("u1").unwrap();
    assert_eq!(loops.len(), 2);
    assert_eq!(loops[0].id, fork.id);
    assert_eq!(loops[1].id, root.id);
}

#[test]
fn explanation_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("codeloop.db");

    let created = {
        let db = Database::open(path.clone()).unwrap();
        let store = LoopStore::new(db.connection());
        let created = store
            .create(&LoopDraft::new(
                "u1",
                "Write a hello world",
                Language::Python,
                "print('hello')",
            ))
            .unwrap();
        store
            .set_explanation(created.id, "Prints the string 'hello'.")
            .unwrap();
        created
    };

    // Reopen the database file and read the record back
    let db = Database::open(path).unwrap();
    let store = LoopStore::new(db.connection());
    let fetched = store.get_by_id(created.id).unwrap().unwrap();

    assert_eq!(
        fetched.explanation.as_deref(),
        Some("Prints the string 'hello'.")
    );
    assert_eq!(fetched.code, created.code);
}

#[test]
fn listing_never_crosses_owners() {
    let (_dir, _db, store) = setup_store();

    for i in 0..5 {
        store
            .create(&LoopDraft::new(
                if i % 2 == 0 { "alice" } else { "bob" },
                format!("Write test number {}", i),
                Language::JavaScript,
                format!("console.log({});", i),
            ))
            .unwrap();
    }

    let alice = store.list_by_owner("alice").unwrap();
    let bob = store.list_by_owner("bob").unwrap();

    assert_eq!(alice.len(), 3);
    assert_eq!(bob.len(), 2);
    assert!(alice.iter().all(|l| l.user_id == "alice"));
    assert!(bob.iter().all(|l| l.user_id == "bob"));

    // Each listing is ordered most recent first
    for pair in alice.windows(2) {
        assert!(pair[0].created_at >= pair[1].created_at);
    }
}

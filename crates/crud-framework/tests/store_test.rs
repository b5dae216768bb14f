use crud_framework::mock::Note;
use crud_framework::persistence::{StoreActor, WriteOp};
use crud_framework::{PersistenceError, Repository, TransactionManager};

fn spawn_store() -> Repository<Note> {
    let (actor, notes) = StoreActor::<Note>::new(16);
    tokio::spawn(actor.run());
    notes
}

fn draft(title: &str) -> Note {
    Note {
        id: None,
        title: title.to_string(),
    }
}

#[tokio::test]
async fn test_insert_assigns_sequential_ids() {
    let notes = spawn_store();

    let first = notes.write(WriteOp::Insert(draft("a"))).await.unwrap();
    let second = notes.write(WriteOp::Insert(draft("b"))).await.unwrap();
    // An id on an inserted entity is ignored
    let third = notes.write(WriteOp::Insert(Note::new(40, "c"))).await.unwrap();

    assert_eq!((first, second, third), (1, 2, 3));
    let titles: Vec<_> = notes
        .find_all()
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.title)
        .collect();
    assert_eq!(titles, ["a", "b", "c"]);
}

#[tokio::test]
async fn test_reads_are_detached() {
    let notes = spawn_store();
    let id = notes.write(WriteOp::Insert(draft("original"))).await.unwrap();

    let mut copy = notes.find_one(id).await.unwrap().expect("Note not found");
    copy.title = "changed in memory".to_string();

    let stored = notes.find_one(id).await.unwrap().expect("Note not found");
    assert_eq!(stored.title, "original");
}

#[tokio::test]
async fn test_commit_applies_staged_writes() {
    let notes = spawn_store();
    let manager = TransactionManager::new();

    let tx = manager.begin();
    let session = tx.session();
    notes.save(&session, draft("first")).unwrap();
    notes.save(&session, draft("second")).unwrap();
    assert_eq!(session.staged_len(), 2);
    // Staged writes are invisible until commit
    assert!(notes.find_all().await.unwrap().is_empty());

    tx.commit().await.expect("Commit failed");

    assert_eq!(notes.find_all().await.unwrap().len(), 2);
    let stats = manager.stats();
    assert_eq!((stats.begun, stats.committed, stats.active), (1, 1, 0));
}

#[tokio::test]
async fn test_save_updates_entities_with_an_id() {
    let notes = spawn_store();
    let manager = TransactionManager::new();
    let id = notes.write(WriteOp::Insert(draft("v1"))).await.unwrap();

    let tx = manager.begin();
    let mut note = notes.find_one(id).await.unwrap().unwrap();
    note.title = "v2".to_string();
    notes.save(&tx.session(), note).unwrap();
    tx.commit().await.unwrap();

    let all = notes.find_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].title, "v2");
}

#[tokio::test]
async fn test_rollback_discards_staged_writes() {
    let notes = spawn_store();
    let manager = TransactionManager::new();

    let tx = manager.begin();
    notes.insert(&tx.session(), draft("never")).unwrap();
    tx.rollback();

    assert!(notes.find_all().await.unwrap().is_empty());
    assert_eq!(manager.stats().rolled_back, 1);
}

#[tokio::test]
async fn test_dropped_transaction_rolls_back() {
    let notes = spawn_store();
    let manager = TransactionManager::new();

    {
        let tx = manager.begin();
        notes.insert(&tx.session(), draft("abandoned")).unwrap();
    }

    assert!(notes.find_all().await.unwrap().is_empty());
    let stats = manager.stats();
    assert_eq!((stats.rolled_back, stats.active), (1, 0));
}

#[tokio::test]
async fn test_staging_after_commit_fails() {
    let notes = spawn_store();
    let manager = TransactionManager::new();

    let tx = manager.begin();
    let session = tx.session();
    tx.commit().await.unwrap();

    let result = notes.insert(&session, draft("late"));
    assert_eq!(
        result,
        Err(PersistenceError::TransactionClosed(session.transaction_id()))
    );
}

#[tokio::test]
async fn test_failed_write_aborts_commit() {
    let notes = spawn_store();
    let manager = TransactionManager::new();

    let tx = manager.begin();
    let session = tx.session();
    notes.insert(&session, draft("applied")).unwrap();
    notes.update(&session, Note::new(99, "missing")).unwrap();
    notes.insert(&session, draft("skipped")).unwrap();

    let result = tx.commit().await;
    assert!(matches!(result, Err(PersistenceError::NotFound(_))));

    let titles: Vec<_> = notes
        .find_all()
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.title)
        .collect();
    assert_eq!(titles, ["applied"]);
    let stats = manager.stats();
    assert_eq!((stats.committed, stats.rolled_back), (0, 1));
}

#[tokio::test]
async fn test_delete_and_find_first() {
    let notes = spawn_store();
    let manager = TransactionManager::new();
    for title in ["red", "green", "blue"] {
        notes.write(WriteOp::Insert(draft(title))).await.unwrap();
    }

    let green = notes
        .find_first(|n: &Note| n.title == "green")
        .await
        .unwrap()
        .expect("Note not found");
    let tx = manager.begin();
    notes.delete(&tx.session(), green.id.unwrap()).unwrap();
    tx.commit().await.unwrap();

    assert!(notes
        .find_first(|n: &Note| n.title == "green")
        .await
        .unwrap()
        .is_none());
    assert_eq!(notes.find_all().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_store_closed_is_reported() {
    let (actor, notes) = StoreActor::<Note>::new(1);
    drop(actor);

    assert_eq!(notes.find_all().await, Err(PersistenceError::StoreClosed));
}

fn same_title(stored: &Note, new: &Note) -> bool {
    stored.title == new.title
}

#[tokio::test]
async fn test_unique_insert_checks_at_commit() {
    let notes = spawn_store();
    let manager = TransactionManager::new();

    // Both stage against an empty table; only the first commit may insert.
    let first = manager.begin();
    let second = manager.begin();
    notes.insert_unique(&first.session(), draft("only"), same_title).unwrap();
    notes.insert_unique(&second.session(), draft("only"), same_title).unwrap();

    first.commit().await.unwrap();
    let result = second.commit().await;
    assert!(matches!(result, Err(PersistenceError::Conflict(_))));

    assert_eq!(notes.find_all().await.unwrap().len(), 1);
    let stats = manager.stats();
    assert_eq!((stats.committed, stats.rolled_back, stats.active), (1, 1, 0));
}

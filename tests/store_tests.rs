//! Record store behaviour under concurrent writers, on a real SQLite file.

use moduletrack::db::{DeleteOutcome, Store};

async fn file_store() -> (Store, std::path::PathBuf) {
    let dir = std::env::temp_dir().join(format!("moduletrack-store-test-{}", uuid::Uuid::new_v4()));
    let db_path = dir.join("records.db");
    let store = Store::new(&format!("sqlite:{}", db_path.display()))
        .await
        .expect("failed to open file store");
    (store, dir)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_confirmed_deletes_never_fail() {
    let (store, dir) = file_store().await;

    for i in 0..50 {
        let name = format!("Board {i}");
        let record = store.create_pcb_type(&name, "").await.unwrap();

        let (a, b) = tokio::join!(
            store.delete_pcb_type_if_named(record.id, &name),
            store.delete_pcb_type_if_named(record.id, &name),
        );
        let outcomes = [a.expect("first delete errored"), b.expect("second delete errored")];

        let deleted = outcomes
            .iter()
            .filter(|o| matches!(o, DeleteOutcome::Deleted(_)))
            .count();
        assert_eq!(deleted, 1, "round {i}: {outcomes:?}");
        assert!(
            outcomes
                .iter()
                .any(|o| matches!(o, DeleteOutcome::NotFound)),
            "round {i}: {outcomes:?}"
        );
        assert!(store.get_pcb_type(record.id).await.unwrap().is_none());
    }

    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_delete_racing_a_rename_reports_mismatch() {
    let (store, dir) = file_store().await;

    for i in 0..50 {
        let name = format!("Panel {i}");
        let renamed = format!("Panel {i} rev B");
        let record = store.create_pcb_type(&name, "").await.unwrap();

        let (deleted, updated) = tokio::join!(
            store.delete_pcb_type_if_named(record.id, &name),
            store.update_pcb_type(record.id, &renamed, ""),
        );
        let updated = updated.expect("rename errored");

        match deleted.expect("delete errored") {
            DeleteOutcome::Deleted(gone) => {
                assert_eq!(gone.name, name);
                assert!(updated.is_none());
                assert!(store.get_pcb_type(record.id).await.unwrap().is_none());
            }
            DeleteOutcome::Mismatch(current) => {
                assert_eq!(current.name, renamed);
                assert!(updated.is_some());
                assert!(store.get_pcb_type(record.id).await.unwrap().is_some());
            }
            DeleteOutcome::NotFound => panic!("round {i}: record vanished without a delete"),
        }
    }

    std::fs::remove_dir_all(dir).ok();
}

//! Integration tests for the persistence boundary.
//!
//! Tests the reference stores through the `EntityStore` trait and the
//! persisted record shape.

use std::path::PathBuf;

use nocturne_foundation::EntityId;
use nocturne_storage::testing::{Health, Name};
use nocturne_storage::{EntityRecord, EntityStore, FileStore, MemoryStore, StoreConfig, component_map, erase};

fn sample_record() -> EntityRecord {
    let map = component_map(vec![erase(Health::new(6)), erase(Name::new("wren"))]);
    EntityRecord::from_components(EntityId::random(), &map)
}

fn scratch_path(tag: &str) -> PathBuf {
    let unique: u64 = rand::random();
    std::env::temp_dir().join(format!("nocturne-it-{tag}-{unique:016x}.db"))
}

// =============================================================================
// Trait-Level Behavior
// =============================================================================

async fn exercise_store(store: &dyn EntityStore) {
    let record = sample_record();
    let id = record.id;

    assert!(store.load(id).await.unwrap().is_none());
    store.save(record.clone()).await.unwrap();
    assert_eq!(store.load(id).await.unwrap(), Some(record.clone()));

    // Save is an upsert.
    let mut updated = record;
    updated.components.remove("Name");
    store.save(updated.clone()).await.unwrap();
    assert_eq!(store.load(id).await.unwrap(), Some(updated));
    assert_eq!(store.load_all().await.unwrap().len(), 1);

    // Deleting an absent id is quiet.
    store.delete(id).await.unwrap();
    store.delete(id).await.unwrap();
    assert!(store.load(id).await.unwrap().is_none());

    store.save(sample_record()).await.unwrap();
    store.clear().await.unwrap();
    assert!(store.load_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn memory_store_honors_the_contract() {
    exercise_store(&MemoryStore::new()).await;
}

#[tokio::test]
async fn file_store_honors_the_contract() {
    let path = scratch_path("contract");
    exercise_store(&FileStore::with_path(&path).unwrap()).await;
    std::fs::remove_file(&path).ok();
}

// =============================================================================
// File Store Durability
// =============================================================================

#[tokio::test]
async fn file_store_round_trips_across_reopen() {
    let path = scratch_path("reopen");
    let record = sample_record();
    let id = record.id;

    {
        let store = FileStore::with_path(&path).unwrap();
        store.save(record.clone()).await.unwrap();
    }

    let store = FileStore::open(&StoreConfig { path: path.clone() }).unwrap();
    assert_eq!(store.load(id).await.unwrap(), Some(record));

    std::fs::remove_file(&path).ok();
}

#[test]
fn file_store_rejects_corrupt_snapshots() {
    let path = scratch_path("corrupt");
    std::fs::write(&path, b"not msgpack at all").unwrap();
    assert!(FileStore::with_path(&path).is_err());
    std::fs::remove_file(&path).ok();
}

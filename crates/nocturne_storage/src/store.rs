//! The persistence collaborator boundary.
//!
//! The world talks to storage through [`EntityStore`], a flat keyed record
//! store with no transactions and no cross-entity guarantees. Two reference
//! implementations ship with the crate: [`MemoryStore`] for tests and
//! [`FileStore`], a msgpack snapshot on disk.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Deserialize;

use nocturne_foundation::{EntityId, Error, Result};

use crate::record::EntityRecord;

/// Durable flat record store keyed by entity id.
///
/// All operations are upserts/point-deletes on whole records; callers must
/// not assume atomicity across ids.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Saves (upserts) one record.
    async fn save(&self, record: EntityRecord) -> Result<()>;

    /// Deletes the record for an id. Deleting an absent id is not an error.
    async fn delete(&self, id: EntityId) -> Result<()>;

    /// Loads the record for an id, if present.
    async fn load(&self, id: EntityId) -> Result<Option<EntityRecord>>;

    /// Loads every stored record.
    async fn load_all(&self) -> Result<Vec<EntityRecord>>;

    /// Removes every stored record. Meant for tests.
    async fn clear(&self) -> Result<()>;
}

/// In-memory record store.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<EntityId, EntityRecord>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().expect("store lock poisoned").len()
    }

    /// Returns true if no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Synchronous point lookup, for test assertions.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<EntityRecord> {
        self.records
            .lock()
            .expect("store lock poisoned")
            .get(&id)
            .cloned()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn save(&self, record: EntityRecord) -> Result<()> {
        self.records
            .lock()
            .expect("store lock poisoned")
            .insert(record.id, record);
        Ok(())
    }

    async fn delete(&self, id: EntityId) -> Result<()> {
        self.records.lock().expect("store lock poisoned").remove(&id);
        Ok(())
    }

    async fn load(&self, id: EntityId) -> Result<Option<EntityRecord>> {
        Ok(self.get(id))
    }

    async fn load_all(&self) -> Result<Vec<EntityRecord>> {
        Ok(self
            .records
            .lock()
            .expect("store lock poisoned")
            .values()
            .cloned()
            .collect())
    }

    async fn clear(&self) -> Result<()> {
        self.records.lock().expect("store lock poisoned").clear();
        Ok(())
    }
}

/// Configuration for the file-backed store.
#[derive(Clone, Debug, Deserialize)]
pub struct StoreConfig {
    /// Snapshot file location.
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("nocturne.entities.db"),
        }
    }
}

/// File-backed record store.
///
/// Keeps every record in memory and rewrites a msgpack snapshot of the whole
/// map after each mutation. Record counts here are small (one flat record per
/// entity), so snapshot rewrites stay cheap.
///
/// The snapshot is written synchronously while the store lock is held. That
/// keeps snapshots ordered under concurrent saves, but it blocks the calling
/// thread for the duration of the write: a reference store for tests and
/// small worlds, not for a busy shared runtime.
pub struct FileStore {
    path: PathBuf,
    records: Mutex<BTreeMap<EntityId, EntityRecord>>,
}

impl FileStore {
    /// Opens a store at the configured path, loading an existing snapshot.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the snapshot exists but cannot be read
    /// or parsed.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        Self::with_path(&config.path)
    }

    /// Opens a store at the given path, loading an existing snapshot.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the snapshot exists but cannot be read
    /// or parsed.
    pub fn with_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let records = if path.exists() {
            let bytes = std::fs::read(&path)
                .map_err(|err| Error::storage(format!("read {}: {err}", path.display())))?;
            rmp_serde::from_slice(&bytes)
                .map_err(|err| Error::storage(format!("parse {}: {err}", path.display())))?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    /// Returns the snapshot path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, records: &BTreeMap<EntityId, EntityRecord>) -> Result<()> {
        let bytes = rmp_serde::to_vec(records)
            .map_err(|err| Error::storage(format!("encode snapshot: {err}")))?;
        std::fs::write(&self.path, bytes)
            .map_err(|err| Error::storage(format!("write {}: {err}", self.path.display())))
    }
}

#[async_trait]
impl EntityStore for FileStore {
    async fn save(&self, record: EntityRecord) -> Result<()> {
        let mut records = self.records.lock().expect("store lock poisoned");
        records.insert(record.id, record);
        self.flush(&records)
    }

    async fn delete(&self, id: EntityId) -> Result<()> {
        let mut records = self.records.lock().expect("store lock poisoned");
        records.remove(&id);
        self.flush(&records)
    }

    async fn load(&self, id: EntityId) -> Result<Option<EntityRecord>> {
        Ok(self
            .records
            .lock()
            .expect("store lock poisoned")
            .get(&id)
            .cloned())
    }

    async fn load_all(&self) -> Result<Vec<EntityRecord>> {
        Ok(self
            .records
            .lock()
            .expect("store lock poisoned")
            .values()
            .cloned()
            .collect())
    }

    async fn clear(&self) -> Result<()> {
        let mut records = self.records.lock().expect("store lock poisoned");
        records.clear();
        self.flush(&records)
    }
}

use std::collections::HashMap;
use std::sync::RwLock;

use arbor_types::ObjectId;
use tracing::{debug, warn};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::object::StoredObject;
use crate::traits::ObjectStore;

/// In-memory, HashMap-based object store.
///
/// Intended for tests and embedding. All objects are held in memory behind a
/// `RwLock` for safe concurrent access. Objects are cloned on read/write.
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<ObjectId, StoredObject>>,
    config: StoreConfig,
}

impl InMemoryObjectStore {
    /// Create a new empty in-memory store with the default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create a new empty in-memory store.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// The configuration this store was built with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored objects.
    pub fn total_bytes(&self) -> u64 {
        self.objects
            .read()
            .expect("lock poisoned")
            .values()
            .map(|obj| obj.size)
            .sum()
    }

    /// Remove all objects from the store.
    pub fn clear(&self) {
        self.objects.write().expect("lock poisoned").clear();
    }

    /// Return a sorted list of all object IDs in the store.
    pub fn all_ids(&self) -> Vec<ObjectId> {
        let map = self.objects.read().expect("lock poisoned");
        let mut ids: Vec<ObjectId> = map.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Store an object under a caller-chosen id without hashing it.
    ///
    /// Used to import objects whose id was computed elsewhere, and to stage
    /// damaged objects in tests. Ignores `read_only`.
    pub fn insert_unchecked(&self, id: ObjectId, object: StoredObject) {
        self.objects
            .write()
            .expect("lock poisoned")
            .insert(id, object);
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        let map = self.objects.read().expect("lock poisoned");
        let Some(object) = map.get(id) else {
            return Ok(None);
        };
        if self.config.verify_on_read {
            let computed = object.compute_id();
            if computed != *id {
                warn!(id = %id, computed = %computed, "stored object failed verification");
                return Err(StoreError::HashMismatch {
                    id: *id,
                    expected: id.to_hex(),
                    computed: computed.to_hex(),
                });
            }
        }
        Ok(Some(object.clone()))
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        if self.config.read_only {
            return Err(StoreError::ReadOnly);
        }
        let id = object.compute_id();
        if id.is_null() {
            return Err(StoreError::NullObjectId);
        }
        let mut map = self.objects.write().expect("lock poisoned");
        // Idempotent: if already present, skip (content-addressing guarantees
        // the same ID always maps to the same content).
        if map.contains_key(&id) {
            debug!(id = %id, kind = %object.kind, "object already present");
        } else {
            debug!(id = %id, kind = %object.kind, size = object.size, "stored object");
            map.insert(id, object.clone());
        }
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.contains_key(id))
    }

    fn delete(&self, id: &ObjectId) -> StoreResult<bool> {
        if self.config.read_only {
            return Err(StoreError::ReadOnly);
        }
        let mut map = self.objects.write().expect("lock poisoned");
        Ok(map.remove(id).is_some())
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len();
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &count)
            .field("config", &self.config)
            .finish()
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;
use tracing::warn;

use super::{BlobStore, StoredObject};
use crate::error::StoreError;
use crate::site::StorageKey;

/// In-process blob store backed by a `HashMap`.
///
/// Clones share the same map, so a clone handed to the gateway sees objects
/// written through any other clone. Contents are lost when the process exits.
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object at a raw key (builder style, for setup code).
    ///
    /// A store with no other handles is always seeded. When clones exist the
    /// write needs the lock without waiting, so if a clone holds a guard at
    /// that moment the object is not stored and a warning is logged; use
    /// [`BlobStore::put`] from async code instead.
    pub fn with_object(
        mut self,
        key: impl Into<String>,
        data: impl Into<Bytes>,
        content_type: impl Into<String>,
    ) -> Self {
        let key = key.into();
        let object = StoredObject::new(data, content_type);

        if let Some(lock) = Arc::get_mut(&mut self.objects) {
            lock.get_mut().insert(key, object);
        } else if let Ok(mut map) = self.objects.try_write() {
            map.insert(key, object);
        } else {
            warn!(key = %key, "Memory store is locked by a clone; object not seeded");
        }
        self
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// All stored keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &StorageKey) -> Result<Option<StoredObject>, StoreError> {
        Ok(self.objects.read().await.get(key.as_str()).cloned())
    }

    async fn put(
        &self,
        key: &StorageKey,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StoreError> {
        self.objects
            .write()
            .await
            .insert(key.to_string(), StoredObject::new(data, content_type));
        Ok(())
    }

    fn identifier(&self) -> &str {
        "memory://"
    }
}

//! Blob store layer.
//!
//! The gateway never touches storage directly; it goes through the
//! [`BlobStore`] trait so the backend can be swapped (S3 in production, an
//! in-memory map for development and tests).

mod memory;
mod s3;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StoreError;
use crate::site::StorageKey;

pub use memory::MemoryBlobStore;
pub use s3::{create_s3_client, S3BlobStore};

/// An object as held by the blob store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Object payload
    pub data: Bytes,

    /// Content type declared when the object was written
    pub content_type: String,
}

impl StoredObject {
    pub fn new(data: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            content_type: content_type.into(),
        }
    }
}

/// Key → bytes persistence with atomic put/get.
///
/// Implementations must be thread-safe; a single store is shared by every
/// in-flight request.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetch the object at `key`.
    ///
    /// Returns `Ok(None)` when no object exists, and an error only when the
    /// store itself could not answer.
    async fn get(&self, key: &StorageKey) -> Result<Option<StoredObject>, StoreError>;

    /// Store `data` at `key`, replacing any existing object.
    async fn put(&self, key: &StorageKey, data: Bytes, content_type: &str)
        -> Result<(), StoreError>;

    /// Identifier for logging (e.g. `s3://bucket`).
    fn identifier(&self) -> &str;
}

#[async_trait]
impl<B: BlobStore + ?Sized> BlobStore for Arc<B> {
    async fn get(&self, key: &StorageKey) -> Result<Option<StoredObject>, StoreError> {
        (**self).get(key).await
    }

    async fn put(
        &self,
        key: &StorageKey,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StoreError> {
        (**self).put(key, data, content_type).await
    }

    fn identifier(&self) -> &str {
        (**self).identifier()
    }
}

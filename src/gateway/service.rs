//! Site Object Gateway.
//!
//! The gateway turns a raw request path into an HTTP response:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        SiteGateway                           │
//! │  serve(raw_path)                                             │
//! │   1. parse_request_path     → 400 on malformed path          │
//! │   2. resolve storage key                                     │
//! │   3. store.get(key)         → 404 on miss, 5xx on failure    │
//! │   4. infer media type, attach Cache-Control                  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The gateway keeps no state between calls. Every request re-fetches from
//! the blob store.

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use tracing::{debug, error};

use crate::error::GatewayError;
use crate::site::{parse_request_path, MediaTypeTable, StorageKey};
use crate::store::BlobStore;

/// Default `Cache-Control` max-age for served objects, in seconds.
pub const DEFAULT_CACHE_MAX_AGE: u32 = 300;

/// Default upper bound on a single blob store fetch, in seconds.
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// Configuration
// =============================================================================

/// Serving policy for the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// `Cache-Control: public, max-age=<cache_max_age>` on found objects
    pub cache_max_age: u32,

    /// Suffix table used to pick the `Content-Type`
    pub media_types: MediaTypeTable,

    /// Abandon a store fetch after this long (None = wait indefinitely)
    pub fetch_timeout: Option<Duration>,
}

impl GatewayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache_max_age(mut self, seconds: u32) -> Self {
        self.cache_max_age = seconds;
        self
    }

    pub fn with_media_types(mut self, media_types: MediaTypeTable) -> Self {
        self.media_types = media_types;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// The `Cache-Control` header value for found objects.
    pub fn cache_control(&self) -> String {
        format!("public, max-age={}", self.cache_max_age)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            cache_max_age: DEFAULT_CACHE_MAX_AGE,
            media_types: MediaTypeTable::default(),
            fetch_timeout: Some(Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS)),
        }
    }
}

// =============================================================================
// Site Object
// =============================================================================

/// An object fetched for a request, ready to be sent.
#[derive(Debug, Clone)]
pub struct SiteObject {
    /// Key the object was read from
    pub key: StorageKey,

    /// Object payload
    pub data: Bytes,

    /// Media type inferred from the sub-path
    pub content_type: String,
}

// =============================================================================
// Gateway
// =============================================================================

/// Serves site objects from a blob store.
pub struct SiteGateway<B: BlobStore> {
    store: B,
    config: GatewayConfig,
}

impl<B: BlobStore> SiteGateway<B> {
    /// Create a gateway with the default serving policy.
    pub fn new(store: B) -> Self {
        Self::with_config(store, GatewayConfig::default())
    }

    pub fn with_config(store: B, config: GatewayConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &B {
        &self.store
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Fetch the object addressed by `raw_path`.
    ///
    /// `raw_path` is the request path with any outer route prefix already
    /// stripped, e.g. `/u1/s1/img/logo.png`.
    pub async fn fetch(&self, raw_path: &str) -> Result<SiteObject, GatewayError> {
        let path = parse_request_path(raw_path)?;
        let key = path.storage_key();

        debug!(
            store = self.store.identifier(),
            key = %key,
            "Fetching site object"
        );

        let lookup = self.store.get(&key);
        let found = match self.config.fetch_timeout {
            // Dropping the future on expiry abandons the in-flight fetch
            Some(limit) => tokio::time::timeout(limit, lookup)
                .await
                .map_err(|_| GatewayError::BackingStoreTimeout(limit))??,
            None => lookup.await?,
        };

        let object = found.ok_or(GatewayError::ObjectNotFound)?;
        let content_type = self.config.media_types.infer(key.sub_path()).to_string();

        Ok(SiteObject {
            key,
            data: object.data,
            content_type,
        })
    }

    /// Serve `raw_path` as a complete HTTP response.
    ///
    /// - `200` with the object body, `Content-Type` and `Cache-Control`
    /// - `400` on a malformed path
    /// - `404` with body `Not found` when nothing is stored at the key
    /// - `502`/`504` when the store fails or times out
    pub async fn serve(&self, raw_path: &str) -> Response {
        match self.fetch(raw_path).await {
            Ok(object) => self.object_response(object),
            Err(err) => err.into_response(),
        }
    }

    fn object_response(&self, object: SiteObject) -> Response {
        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, object.content_type)
            .header(header::CACHE_CONTROL, self.config.cache_control())
            .body(Body::from(object.data))
            .unwrap_or_else(|e| {
                error!(key = %object.key, "Failed to build response: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            })
    }
}

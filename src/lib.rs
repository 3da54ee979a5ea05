//! # proxyhost
//!
//! A multi-tenant static site gateway backed by S3-compatible object storage.
//!
//! Uploaded HTML documents are stored under `sites/<tenant>/<site>/...` and
//! served back at `<prefix>/<tenant>/<site>/<path>` with a content type
//! inferred from the requested path and a public `Cache-Control` header.
//! Every request goes to storage; nothing is cached in process.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`site`] - Tenant/site identifiers, storage key layout, media types
//! - [`store`] - Blob store abstraction with S3 and in-memory backends
//! - [`gateway`] - Site serving and publishing over a blob store
//! - [`server`] - Axum-based HTTP server and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use proxyhost::{create_router, MemoryBlobStore, RouterConfig};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let store = MemoryBlobStore::new().with_object(
//!         "sites/demo/hello/index.html",
//!         "<h1>Hello</h1>",
//!         "text/html",
//!     );
//!     let router = create_router(store, RouterConfig::new());
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8787").await?;
//!     axum::serve(listener, router).await
//! }
//! ```

pub mod config;
pub mod error;
pub mod gateway;
pub mod server;
pub mod site;
pub mod store;

// Re-export commonly used types
pub use config::{CheckConfig, Cli, Command, ServeConfig, StorageArgs, StorageBackend};
pub use error::{GatewayError, PathError, PublishError, StoreError};
pub use gateway::{
    GatewayConfig, PublishedSite, SiteGateway, SiteObject, SitePublisher, DEFAULT_CACHE_MAX_AGE,
    DEFAULT_FETCH_TIMEOUT_SECS, HTML_CONTENT_TYPE,
};
pub use server::{
    create_router, health_handler, site_handler, site_root_handler, upload_handler, AppState,
    ErrorResponse, HealthResponse, RouterConfig, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_SITE_PREFIX,
};
pub use site::{
    parse_request_path, resolve, MediaTypeRule, MediaTypeTable, SiteId, SitePath, StorageKey,
    TenantId, DEFAULT_MEDIA_TYPE, INDEX_DOCUMENT, SITES_ROOT,
};
pub use store::{create_s3_client, BlobStore, MemoryBlobStore, S3BlobStore, StoredObject};

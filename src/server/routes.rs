//! Router configuration for the site gateway.
//!
//! This module defines the HTTP routes and applies middleware for CORS,
//! upload size limits and request tracing.
//!
//! # Route Structure
//!
//! ```text
//! /health                              - Health check
//! /site/{tenant}/{site}/{path...}      - Site objects (prefix configurable)
//! /api/sites/{tenant_id}               - Publish a site (POST)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use proxyhost::server::routes::{create_router, RouterConfig};
//! use proxyhost::store::MemoryBlobStore;
//!
//! let router = create_router(MemoryBlobStore::new(), RouterConfig::new());
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8787").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use http::header::CONTENT_TYPE;
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    health_handler, site_handler, site_root_handler, upload_handler, AppState,
};
use crate::gateway::{GatewayConfig, SiteGateway, SitePublisher};
use crate::store::BlobStore;

/// Default route prefix for served sites.
pub const DEFAULT_SITE_PREFIX: &str = "/site";

/// Default upload size limit (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Serving policy handed to the gateway
    pub gateway: GatewayConfig,

    /// Prefix stripped before the gateway sees the path ("/" mounts at root)
    pub site_prefix: String,

    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Largest accepted upload body in bytes
    pub max_upload_bytes: usize,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a router configuration with defaults.
    ///
    /// By default:
    /// - Sites are served under `/site`
    /// - CORS allows any origin
    /// - Uploads are limited to 10 MiB
    /// - Tracing is enabled
    pub fn new() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            site_prefix: DEFAULT_SITE_PREFIX.to_string(),
            cors_origins: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            enable_tracing: true,
        }
    }

    pub fn with_gateway(mut self, gateway: GatewayConfig) -> Self {
        self.gateway = gateway;
        self
    }

    /// Set the route prefix for served sites.
    pub fn with_site_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.site_prefix = prefix.into();
        self
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Allow any CORS origin.
    pub fn with_cors_any_origin(mut self) -> Self {
        self.cors_origins = None;
        self
    }

    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }

    /// Site prefix without a trailing slash; empty when mounted at root.
    fn normalized_prefix(&self) -> &str {
        self.site_prefix.trim_end_matches('/')
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// The store is cloned once so the gateway and the publisher share it;
/// stores are expected to be cheap handles (`Arc`, SDK clients).
pub fn create_router<B>(store: B, config: RouterConfig) -> Router
where
    B: BlobStore + Clone + 'static,
{
    let prefix = config.normalized_prefix().to_string();

    let gateway = SiteGateway::with_config(store.clone(), config.gateway.clone());
    let publisher = SitePublisher::new(store, prefix.clone());
    let app_state = AppState::new(gateway, publisher);

    let cors = build_cors_layer(&config);

    let site_routes = Router::new()
        .route("/", get(site_root_handler::<B>))
        .route("/{*path}", get(site_handler::<B>))
        .with_state(app_state.clone());

    let api_routes = Router::new()
        .route("/sites/{tenant_id}", post(upload_handler::<B>))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .with_state(app_state.clone());

    let router = Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api_routes);

    // Nesting strips the prefix from the URI the site handler sees. A nested
    // "/" only matches the bare prefix, so "<prefix>/" is routed explicitly.
    let router = if prefix.is_empty() {
        router.merge(site_routes)
    } else {
        router.nest(&prefix, site_routes).route(
            &format!("{}/", prefix),
            get(site_root_handler::<B>).with_state(app_state),
        )
    };

    let router = router.layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::HEAD, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(86400)); // 24 hours

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

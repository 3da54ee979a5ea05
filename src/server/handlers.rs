//! HTTP request handlers for the site gateway.
//!
//! # Endpoints
//!
//! - `GET <prefix>/{tenant}/{site}/{path...}` - Serve a site object
//! - `GET <prefix>` - Bare prefix, rejected as a malformed site path
//! - `POST /api/sites/{tenant_id}` - Publish a new site
//! - `GET /health` - Health check endpoint

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{RawPathParams, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::error::{GatewayError, PathError, PublishError};
use crate::gateway::{PublishedSite, SiteGateway, SitePublisher};
use crate::store::BlobStore;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the gateway and publisher.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<B: BlobStore> {
    /// Serves site objects
    pub gateway: Arc<SiteGateway<B>>,

    /// Creates new sites
    pub publisher: Arc<SitePublisher<B>>,
}

impl<B: BlobStore> AppState<B> {
    pub fn new(gateway: SiteGateway<B>, publisher: SitePublisher<B>) -> Self {
        Self {
            gateway: Arc::new(gateway),
            publisher: Arc::new(publisher),
        }
    }
}

impl<B: BlobStore> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            publisher: Arc::clone(&self.publisher),
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned by the API endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "empty_upload", "storage_error")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Log an error response at a level matching its status.
///
/// 5xx at ERROR, 404 at DEBUG (common and expected), other 4xx at WARN.
fn log_error_response(status: StatusCode, error_type: &str, detail: &dyn std::fmt::Display) {
    if status.is_server_error() {
        error!(
            error_type = error_type,
            status = status.as_u16(),
            "Server error: {}",
            detail
        );
    } else if status == StatusCode::NOT_FOUND {
        debug!(
            error_type = error_type,
            status = status.as_u16(),
            "Resource not found: {}",
            detail
        );
    } else {
        warn!(
            error_type = error_type,
            status = status.as_u16(),
            "Client error: {}",
            detail
        );
    }
}

/// Convert GatewayError to a plain-text HTTP response.
///
/// Bodies are fixed strings; keys and tenant identifiers only reach the log.
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, error_type, body) = match &self {
            GatewayError::MalformedPath(_) => (
                StatusCode::BAD_REQUEST,
                "malformed_path",
                "Malformed site path",
            ),
            GatewayError::ObjectNotFound => (StatusCode::NOT_FOUND, "not_found", "Not found"),
            GatewayError::BackingStoreUnavailable(_) => (
                StatusCode::BAD_GATEWAY,
                "storage_unavailable",
                "Storage backend unavailable",
            ),
            GatewayError::BackingStoreTimeout(_) => (
                StatusCode::GATEWAY_TIMEOUT,
                "storage_timeout",
                "Storage backend timed out",
            ),
        };

        log_error_response(status, error_type, &self);

        (status, body).into_response()
    }
}

/// Convert PublishError to a JSON HTTP response.
impl IntoResponse for PublishError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            PublishError::InvalidTenant(PathError::EmptyIdentifier { .. }) => (
                StatusCode::BAD_REQUEST,
                "invalid_tenant",
                "Tenant id must not be empty",
            ),
            PublishError::InvalidTenant(_) => (
                StatusCode::BAD_REQUEST,
                "invalid_tenant",
                "Tenant id must be a single path segment",
            ),
            PublishError::EmptyUpload => (
                StatusCode::BAD_REQUEST,
                "empty_upload",
                "Upload body must not be empty",
            ),
            PublishError::Store(_) => (
                StatusCode::BAD_GATEWAY,
                "storage_error",
                "Failed to store site",
            ),
        };

        log_error_response(status, error_type, &self);

        let error_response = ErrorResponse::with_status(error_type, message, status);
        (status, Json(error_response)).into_response()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle site object requests.
///
/// # Endpoint
///
/// `GET <prefix>/{tenant}/{site}/{path...}`
///
/// The router strips `<prefix>`, so `uri` holds only `/{tenant}/{site}/...`.
/// The path is used undecoded.
///
/// # Response
///
/// - `200 OK`: object bytes with `Content-Type` and `Cache-Control`
/// - `400 Bad Request`: fewer than two segments, or a dot segment
/// - `404 Not Found`: `Not found`
/// - `502 Bad Gateway` / `504 Gateway Timeout`: storage failure
pub async fn site_handler<B: BlobStore>(State(state): State<AppState<B>>, uri: Uri) -> Response {
    state.gateway.serve(uri.path()).await
}

/// Handle requests for the bare site prefix (`<prefix>` or `<prefix>/`).
///
/// These carry neither tenant nor site and answer `400 Bad Request`.
pub async fn site_root_handler<B: BlobStore>(State(state): State<AppState<B>>) -> Response {
    state.gateway.serve("/").await
}

/// Handle site uploads.
///
/// # Endpoint
///
/// `POST /api/sites/{tenant_id}`
///
/// The request body is the HTML document to publish. The tenant segment is
/// taken undecoded so it matches what the site handler sees in served URLs.
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "siteId": "6f0c5c8e-3b0a-4d55-9f2e-0c6a1c6b8e41",
///   "url": "/site/demo-user/6f0c5c8e-3b0a-4d55-9f2e-0c6a1c6b8e41/"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: empty body or unusable tenant id
/// - `413 Payload Too Large`: body exceeds the configured limit
/// - `502 Bad Gateway`: storage error
pub async fn upload_handler<B: BlobStore>(
    State(state): State<AppState<B>>,
    params: RawPathParams,
    body: Bytes,
) -> Result<Json<PublishedSite>, PublishError> {
    let tenant = params
        .iter()
        .find(|(name, _)| *name == "tenant_id")
        .map(|(_, value)| value)
        .unwrap_or_default();

    let published = state.publisher.publish(tenant, body).await?;
    Ok(Json(published))
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Tests
// =============================================================================

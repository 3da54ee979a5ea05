use std::time::Duration;

use thiserror::Error;

/// Errors raised while turning a request path into a storage key.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// Fewer than two non-empty segments (tenant and site are both required)
    #[error("Malformed site path: expected /<tenant>/<site>[/<path>], found {segments} segment(s)")]
    MalformedPath { segments: usize },

    /// A `.` or `..` segment appeared in the path
    #[error("Malformed site path: dot segments are not allowed")]
    DotSegment,

    /// A tenant or site identifier was empty
    #[error("Invalid {field}: must not be empty")]
    EmptyIdentifier { field: &'static str },

    /// A tenant or site identifier contained a `/`
    #[error("Invalid {field}: must not contain '/'")]
    SlashInIdentifier { field: &'static str },
}

/// Errors from the backing blob store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Error reported by S3 or an S3-compatible service
    #[error("S3 error: {0}")]
    S3(String),

    /// Network or connection error while talking to the store
    #[error("Connection error: {0}")]
    Connection(String),
}

/// Errors that can occur when serving a site object.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The request path could not be resolved to a key (maps to HTTP 400)
    #[error(transparent)]
    MalformedPath(#[from] PathError),

    /// No object exists at the resolved key (maps to HTTP 404)
    #[error("Object not found")]
    ObjectNotFound,

    /// The store failed; safe to retry at the caller's discretion
    #[error("Backing store unavailable: {0}")]
    BackingStoreUnavailable(#[from] StoreError),

    /// The store did not answer within the configured fetch timeout
    #[error("Backing store timed out after {0:?}")]
    BackingStoreTimeout(Duration),
}

/// Errors that can occur when publishing a new site.
#[derive(Debug, Clone, Error)]
pub enum PublishError {
    /// The tenant identifier is not usable as a key segment
    #[error(transparent)]
    InvalidTenant(#[from] PathError),

    /// The uploaded document was empty
    #[error("Upload body is empty")]
    EmptyUpload,

    /// The store rejected or failed the write
    #[error("Failed to store site: {0}")]
    Store(#[from] StoreError),
}

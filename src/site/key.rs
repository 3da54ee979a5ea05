//! Tenant-scoped storage key resolution.
//!
//! Every hosted object lives under a single key scheme:
//!
//! ```text
//! sites/<tenant_id>/<site_id>/<sub_path>
//! ```
//!
//! The serving path and the publishing path both go through [`resolve`], so an
//! object written by one is always found by the other.

use std::fmt;

use uuid::Uuid;

use crate::error::PathError;

/// Root prefix for all hosted objects in the blob store.
pub const SITES_ROOT: &str = "sites";

/// Document served when a request targets the site root.
pub const INDEX_DOCUMENT: &str = "index.html";

// =============================================================================
// Identifiers
// =============================================================================

fn validate_segment(value: &str, field: &'static str) -> Result<(), PathError> {
    if value.is_empty() {
        return Err(PathError::EmptyIdentifier { field });
    }
    if value.contains('/') {
        return Err(PathError::SlashInIdentifier { field });
    }
    Ok(())
}

/// Opaque identifier of the tenant (user) owning a site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantId(String);

impl TenantId {
    /// Create a tenant id, rejecting empty values and values containing `/`.
    pub fn new(id: impl Into<String>) -> Result<Self, PathError> {
        let id = id.into();
        validate_segment(&id, "tenant id")?;
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identifier of one hosted site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SiteId(String);

impl SiteId {
    /// Create a site id, rejecting empty values and values containing `/`.
    pub fn new(id: impl Into<String>) -> Result<Self, PathError> {
        let id = id.into();
        validate_segment(&id, "site id")?;
        Ok(Self(id))
    }

    /// Generate a fresh random site id (hyphenated UUID v4).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Storage Key
// =============================================================================

/// Canonical address of a site object in the blob store.
///
/// Only [`resolve`] builds keys, so every key has the form
/// `sites/<tenant>/<site>/<sub_path>` with a non-empty sub-path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey {
    key: String,
    sub_path_offset: usize,
}

impl StorageKey {
    /// The full key string.
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// The (normalized) sub-path portion of the key.
    pub fn sub_path(&self) -> &str {
        &self.key[self.sub_path_offset..]
    }

    /// Split the key back into `(tenant, site, sub_path)`.
    ///
    /// The sub-path may itself contain `/`; it is everything after the site
    /// segment.
    pub fn parts(&self) -> (&str, &str, &str) {
        let rest = &self.key[SITES_ROOT.len() + 1..];
        let mut split = rest.splitn(3, '/');
        let tenant = split.next().unwrap_or_default();
        let site = split.next().unwrap_or_default();
        let sub_path = split.next().unwrap_or_default();
        (tenant, site, sub_path)
    }

    pub fn into_string(self) -> String {
        self.key
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.key
    }
}

/// Build the storage key for a site object.
///
/// An empty or root-only (`/`) sub-path resolves to [`INDEX_DOCUMENT`]. No
/// other normalization happens: dot segments and trailing slashes are kept
/// verbatim.
pub fn resolve(tenant: &TenantId, site: &SiteId, sub_path: &str) -> StorageKey {
    let sub_path = if sub_path.is_empty() || sub_path == "/" {
        INDEX_DOCUMENT
    } else {
        sub_path
    };

    let prefix = format!("{}/{}/{}/", SITES_ROOT, tenant, site);
    let sub_path_offset = prefix.len();

    StorageKey {
        key: prefix + sub_path,
        sub_path_offset,
    }
}

// =============================================================================
// Request Paths
// =============================================================================

/// A request path split into its tenant, site and sub-path parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitePath {
    tenant: TenantId,
    site: SiteId,
    sub_path: String,
}

impl SitePath {
    pub fn tenant(&self) -> &TenantId {
        &self.tenant
    }

    pub fn site(&self) -> &SiteId {
        &self.site
    }

    /// The raw sub-path; empty when the request targets the site root.
    pub fn sub_path(&self) -> &str {
        &self.sub_path
    }

    /// Resolve this path to its storage key.
    pub fn storage_key(&self) -> StorageKey {
        resolve(&self.tenant, &self.site, &self.sub_path)
    }
}

/// Split a raw request path into tenant, site and sub-path.
///
/// The path is split on `/` and empty segments are dropped. The first two
/// segments are the tenant and site; the rest are rejoined with `/` to form
/// the sub-path. The path is taken as received: no percent-decoding happens,
/// so an encoded `%2F` never introduces a segment boundary.
///
/// Fails with [`PathError::MalformedPath`] when fewer than two segments are
/// present, and with [`PathError::DotSegment`] when any segment is `.` or
/// `..`.
pub fn parse_request_path(raw_path: &str) -> Result<SitePath, PathError> {
    let segments: Vec<&str> = raw_path.split('/').filter(|s| !s.is_empty()).collect();

    if segments.len() < 2 {
        return Err(PathError::MalformedPath {
            segments: segments.len(),
        });
    }

    if segments.iter().any(|s| *s == "." || *s == "..") {
        return Err(PathError::DotSegment);
    }

    Ok(SitePath {
        tenant: TenantId::new(segments[0])?,
        site: SiteId::new(segments[1])?,
        sub_path: segments[2..].join("/"),
    })
}

//! Site publishing.
//!
//! Writes an uploaded HTML document as the entry point of a brand-new site.
//! The key comes from the same resolver the gateway reads with.

use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::error::{PathError, PublishError};
use crate::site::{resolve, SiteId, TenantId, INDEX_DOCUMENT};
use crate::store::BlobStore;

/// Content type recorded for published entry documents.
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Result of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedSite {
    /// Freshly generated site identifier
    pub site_id: String,

    /// Public URL path of the site root
    pub url: String,
}

/// Creates new sites in the blob store.
pub struct SitePublisher<B: BlobStore> {
    store: B,
    site_prefix: String,
}

impl<B: BlobStore> SitePublisher<B> {
    /// Create a publisher whose returned URLs live under `site_prefix`
    /// (e.g. `/site`).
    pub fn new(store: B, site_prefix: impl Into<String>) -> Self {
        let site_prefix = site_prefix.into().trim_end_matches('/').to_string();
        Self { store, site_prefix }
    }

    pub fn store(&self) -> &B {
        &self.store
    }

    /// URL path under which a site is served.
    pub fn site_url(&self, tenant: &TenantId, site: &SiteId) -> String {
        format!("{}/{}/{}/", self.site_prefix, tenant, site)
    }

    /// Store `html` as the index document of a new site owned by `tenant`.
    ///
    /// Every call creates a new site; ids are never reused.
    pub async fn publish(&self, tenant: &str, html: Bytes) -> Result<PublishedSite, PublishError> {
        if html.is_empty() {
            return Err(PublishError::EmptyUpload);
        }

        // Dot segments are refused when serving, so the site would be unreachable
        if tenant == "." || tenant == ".." {
            return Err(PublishError::InvalidTenant(PathError::DotSegment));
        }

        let tenant = TenantId::new(tenant)?;
        let site = SiteId::generate();
        let key = resolve(&tenant, &site, INDEX_DOCUMENT);
        let size = html.len();

        self.store.put(&key, html, HTML_CONTENT_TYPE).await?;

        info!(
            tenant = %tenant,
            site = %site,
            bytes = size,
            "Published site"
        );

        Ok(PublishedSite {
            url: self.site_url(&tenant, &site),
            site_id: site.to_string(),
        })
    }
}

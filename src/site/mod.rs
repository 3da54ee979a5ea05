//! Site addressing.
//!
//! Maps request paths to storage keys and picks the media type of what is
//! stored there.
//!
//! ```text
//! GET /site/u1/s1/img/logo.png
//!           │   │  └────────┴── sub-path  (empty → index.html)
//!           │   └────────────── site id
//!           └────────────────── tenant id
//!
//!   → sites/u1/s1/img/logo.png  (image/png)
//! ```

mod key;
mod media;

pub use key::{
    parse_request_path, resolve, SiteId, SitePath, StorageKey, TenantId, INDEX_DOCUMENT,
    SITES_ROOT,
};
pub use media::{MediaTypeRule, MediaTypeTable, DEFAULT_MEDIA_TYPE};

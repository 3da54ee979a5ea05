//! Site serving and publishing.
//!
//! # Components
//!
//! - [`SiteGateway`]: resolves request paths and serves stored objects
//! - [`GatewayConfig`]: cache policy, media-type table and fetch timeout
//! - [`SitePublisher`]: stores uploaded HTML as the entry point of a new site
//!
//! Both sides address the blob store through [`crate::site::resolve`], so
//! anything published is reachable through the gateway.

mod publish;
mod service;

pub use publish::{PublishedSite, SitePublisher, HTML_CONTENT_TYPE};
pub use service::{
    GatewayConfig, SiteGateway, SiteObject, DEFAULT_CACHE_MAX_AGE, DEFAULT_FETCH_TIMEOUT_SECS,
};

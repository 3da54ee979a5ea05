//! HTTP server layer for the site gateway.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │      GET /site/{tenant}/{site}/{path...}  POST /api/sites/{t}   │
//! │                                                                 │
//! │  ┌─────────────────────────┐  ┌─────────────────────────────┐   │
//! │  │        handlers         │  │           routes            │   │
//! │  │ (requests, error → HTTP)│  │ (prefix, CORS, body limit)  │   │
//! │  └─────────────────────────┘  └─────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod handlers;
pub mod routes;

pub use handlers::{
    health_handler, site_handler, site_root_handler, upload_handler, AppState, ErrorResponse,
    HealthResponse,
};
pub use routes::{create_router, RouterConfig, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_SITE_PREFIX};

//! API integration tests for site serving and error handling.
//!
//! Tests verify:
//! - Object retrieval and the index document fallback
//! - Content-Type inference and Cache-Control headers
//! - Error cases (malformed path, missing object, storage failure)
//! - Route prefix handling
//! - Every request reaching the store

use axum::body::Body;
use axum::http::StatusCode;

use proxyhost::gateway::GatewayConfig;
use proxyhost::{create_router, MediaTypeTable, RouterConfig};

use super::test_utils::{
    body_bytes, body_string, get, header, seeded_store, send, FailingStore, TrackingStore,
    INDEX_HTML, STYLE_CSS,
};

fn router_config() -> RouterConfig {
    RouterConfig::new().with_tracing(false)
}

// =============================================================================
// Basic Retrieval
// =============================================================================

#[tokio::test]
async fn test_site_index_with_trailing_slash() {
    let router = create_router(seeded_store(), router_config());

    let response = get(router, "/site/acme/s1/").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header(&response, "content-type"),
        Some("text/html; charset=utf-8")
    );
    assert_eq!(
        header(&response, "cache-control"),
        Some("public, max-age=300")
    );
    assert_eq!(body_string(response).await, INDEX_HTML);
}

#[tokio::test]
async fn test_site_index_without_trailing_slash() {
    let router = create_router(seeded_store(), router_config());

    let response = get(router, "/site/acme/s1").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, INDEX_HTML);
}

#[tokio::test]
async fn test_nested_asset() {
    let router = create_router(seeded_store(), router_config());

    let response = get(router, "/site/acme/s1/css/style.css").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header(&response, "content-type"),
        Some("text/css; charset=utf-8")
    );
    assert_eq!(body_string(response).await, STYLE_CSS);
}

#[tokio::test]
async fn test_binary_asset_bytes_unchanged() {
    let router = create_router(seeded_store(), router_config());

    let response = get(router, "/site/acme/s1/img/Logo.PNG").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "content-type"), Some("image/png"));
    assert_eq!(
        body_bytes(response).await.as_ref(),
        &[0x89u8, b'P', b'N', b'G']
    );
}

#[tokio::test]
async fn test_content_type_ignores_stored_type() {
    // Stored as text/plain, but ".bin" has no rule
    let router = create_router(seeded_store(), router_config());

    let response = get(router, "/site/acme/s1/data.bin").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header(&response, "content-type"),
        Some("application/octet-stream")
    );
}

#[tokio::test]
async fn test_percent_encoded_path_used_verbatim() {
    let store = seeded_store().with_object(
        "sites/acme/s1/my%20page.html",
        "<p>encoded</p>",
        "text/html",
    );
    let router = create_router(store, router_config());

    let response = get(router.clone(), "/site/acme/s1/my%20page.html").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "<p>encoded</p>");

    let response = get(router, "/site/acme/s1/my%2520page.html").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_head_request_has_headers_but_no_body() {
    let router = create_router(seeded_store(), router_config());

    let response = send(router, "HEAD", "/site/acme/s1/css/style.css", Body::empty()).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header(&response, "content-type"),
        Some("text/css; charset=utf-8")
    );
    assert!(body_bytes(response).await.is_empty());
}

// =============================================================================
// Error Cases
// =============================================================================

#[tokio::test]
async fn test_missing_object_returns_404() {
    let router = create_router(seeded_store(), router_config());

    let response = get(router, "/site/acme/s1/nope.html").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_string(response).await, "Not found");
}

#[tokio::test]
async fn test_unknown_tenant_returns_404() {
    let router = create_router(seeded_store(), router_config());

    let response = get(router, "/site/other/s1/").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_single_segment_returns_400() {
    let router = create_router(seeded_store(), router_config());

    let response = get(router, "/site/acme").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_string(response).await, "Malformed site path");
}

#[tokio::test]
async fn test_bare_prefix_returns_400() {
    let store = TrackingStore::new(seeded_store());
    let router = create_router(store.clone(), router_config());

    for uri in ["/site", "/site/", "/site//"] {
        let response = get(router.clone(), uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri: {}", uri);
        assert_eq!(body_string(response).await, "Malformed site path");
    }

    assert_eq!(store.get_count(), 0);
}

#[tokio::test]
async fn test_bare_root_prefix_returns_400() {
    let router = create_router(seeded_store(), router_config().with_site_prefix("/"));

    let response = get(router, "/").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_string(response).await, "Malformed site path");
}

#[tokio::test]
async fn test_bare_custom_prefix_returns_400() {
    let router = create_router(seeded_store(), router_config().with_site_prefix("/hosted"));

    for uri in ["/hosted", "/hosted/"] {
        let response = get(router.clone(), uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri: {}", uri);
    }
}

#[tokio::test]
async fn test_dot_segments_rejected() {
    let store = TrackingStore::new(seeded_store());
    let router = create_router(store.clone(), router_config());

    let response = get(router.clone(), "/site/acme/s1/../s2/index.html").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(router, "/site/acme/./s1/index.html").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Rejected before reaching storage
    assert_eq!(store.get_count(), 0);
}

#[tokio::test]
async fn test_storage_failure_returns_502() {
    let router = create_router(FailingStore::service_error(), router_config());

    let response = get(router, "/site/acme/s1/index.html").await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_string(response).await;
    assert_eq!(body, "Storage backend unavailable");
    assert!(!body.contains("AccessDenied"));
}

#[tokio::test]
async fn test_storage_connection_failure_returns_502() {
    let router = create_router(FailingStore::connection_error(), router_config());

    let response = get(router, "/site/acme/s1/").await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_unrouted_path_returns_404() {
    let router = create_router(seeded_store(), router_config());

    let response = get(router, "/elsewhere/acme/s1/").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Route Prefix
// =============================================================================

#[tokio::test]
async fn test_custom_site_prefix() {
    let router = create_router(seeded_store(), router_config().with_site_prefix("/hosted/"));

    let response = get(router.clone(), "/hosted/acme/s1/css/style.css").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(router, "/site/acme/s1/css/style.css").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_root_site_prefix() {
    let router = create_router(seeded_store(), router_config().with_site_prefix("/"));

    let response = get(router.clone(), "/acme/s1/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, INDEX_HTML);

    // Built-in routes still win over the site wildcard
    let response = get(router, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
}

// =============================================================================
// Gateway Configuration
// =============================================================================

#[tokio::test]
async fn test_custom_cache_max_age() {
    let config = router_config().with_gateway(GatewayConfig::new().with_cache_max_age(60));
    let router = create_router(seeded_store(), config);

    let response = get(router, "/site/acme/s1/").await;

    assert_eq!(
        header(&response, "cache-control"),
        Some("public, max-age=60")
    );
}

#[tokio::test]
async fn test_custom_media_type_table() {
    let table = MediaTypeTable::default().with_rule(".bin", "application/x-test");
    let config = router_config().with_gateway(GatewayConfig::new().with_media_types(table));
    let router = create_router(seeded_store(), config);

    let response = get(router, "/site/acme/s1/data.bin").await;

    assert_eq!(header(&response, "content-type"), Some("application/x-test"));
}

// =============================================================================
// Storage Access
// =============================================================================

#[tokio::test]
async fn test_every_request_reaches_store() {
    let store = TrackingStore::new(seeded_store());
    let router = create_router(store.clone(), router_config());

    for _ in 0..3 {
        let response = get(router.clone(), "/site/acme/s1/css/style.css").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(store.get_count(), 3);
}

#[tokio::test]
async fn test_requests_map_to_storage_keys() {
    let store = TrackingStore::new(seeded_store());
    let router = create_router(store.clone(), router_config());

    get(router.clone(), "/site/acme/s1/").await;
    get(router.clone(), "/site/acme/s1/css/style.css").await;
    get(router, "/site/acme/s2/missing.js").await;

    assert_eq!(
        store.requested_keys().await,
        vec![
            "sites/acme/s1/index.html".to_string(),
            "sites/acme/s1/css/style.css".to_string(),
            "sites/acme/s2/missing.js".to_string(),
        ]
    );
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let router = create_router(seeded_store(), router_config());

    let response = get(router, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn test_cors_headers_present() {
    let router = create_router(seeded_store(), router_config());

    let request = axum::http::Request::builder()
        .uri("/site/acme/s1/")
        .header("origin", "https://example.com")
        .body(Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(router, request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "access-control-allow-origin"), Some("*"));
}

//! Real service integration tests using MinIO.
//!
//! These tests exercise the S3 blob store and the full router against a real
//! S3-compatible service.
//!
//! # Requirements
//!
//! A MinIO server must be reachable at `http://localhost:9000` with the
//! default `minioadmin` credentials:
//!
//! ```bash
//! docker run -p 9000:9000 minio/minio server /data
//! ```
//!
//! The bucket is created on first use.
//!
//! # Running the tests
//!
//! ```bash
//! cargo test --test integration real_service -- --ignored
//! ```
//!
//! These tests are marked as `#[ignore]` by default because they require external
//! services to be running.

use std::time::Duration;

use axum::body::Body;
use axum::http::StatusCode;
use bytes::Bytes;

use proxyhost::store::{BlobStore, S3BlobStore};
use proxyhost::{create_router, resolve, RouterConfig, SiteId, TenantId};

use super::test_utils::{body_string, get, header, send};

/// Default URL for a local MinIO
const MINIO_ENDPOINT: &str = "http://localhost:9000";
const MINIO_BUCKET: &str = "proxyhost-test";

/// MinIO default credentials
const MINIO_ACCESS_KEY: &str = "minioadmin";
const MINIO_SECRET_KEY: &str = "minioadmin";

/// Check if the MinIO service is reachable
async fn is_minio_available() -> bool {
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
    {
        Ok(c) => c,
        Err(_) => return false,
    };

    client
        .get(format!("{}/minio/health/live", MINIO_ENDPOINT))
        .send()
        .await
        .map(|r| r.status().is_success())
        .unwrap_or(false)
}

/// Create an S3 client configured for MinIO
fn create_minio_client() -> aws_sdk_s3::Client {
    let creds = aws_sdk_s3::config::Credentials::new(
        MINIO_ACCESS_KEY,
        MINIO_SECRET_KEY,
        None,
        None,
        "test",
    );

    let config = aws_sdk_s3::Config::builder()
        .behavior_version_latest()
        .region(aws_sdk_s3::config::Region::new("us-east-1"))
        .endpoint_url(MINIO_ENDPOINT)
        .credentials_provider(creds)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(config)
}

/// Create the test bucket, ignoring "already exists" failures.
async fn ensure_bucket(client: &aws_sdk_s3::Client) {
    let _ = client.create_bucket().bucket(MINIO_BUCKET).send().await;
}

/// Build a store against MinIO, or None when MinIO is not running.
async fn minio_store() -> Option<S3BlobStore> {
    if !is_minio_available().await {
        return None;
    }
    let client = create_minio_client();
    ensure_bucket(&client).await;
    Some(S3BlobStore::new(client, MINIO_BUCKET))
}

/// Helper to skip test with a message
macro_rules! skip_if_none {
    ($opt:expr) => {
        match $opt {
            Some(value) => value,
            None => {
                eprintln!("SKIPPED: MinIO not available at {}", MINIO_ENDPOINT);
                return;
            }
        }
    };
}

// =============================================================================
// S3 Blob Store
// =============================================================================

#[tokio::test]
#[ignore]
async fn test_s3_bucket_check() {
    let store = skip_if_none!(minio_store().await);

    assert!(store.check().await.is_ok());
    assert_eq!(store.identifier(), format!("s3://{}", MINIO_BUCKET));
}

#[tokio::test]
#[ignore]
async fn test_s3_put_then_get() {
    let store = skip_if_none!(minio_store().await);

    let tenant = TenantId::new("real-tenant").unwrap();
    let site = SiteId::generate();
    let key = resolve(&tenant, &site, "css/app.css");

    store
        .put(&key, Bytes::from_static(b"p { margin: 0 }"), "text/css")
        .await
        .unwrap();

    let object = store.get(&key).await.unwrap().expect("object should exist");
    assert_eq!(object.data.as_ref(), b"p { margin: 0 }");
    assert_eq!(object.content_type, "text/css");
}

#[tokio::test]
#[ignore]
async fn test_s3_missing_key_is_none() {
    let store = skip_if_none!(minio_store().await);

    let tenant = TenantId::new("real-tenant").unwrap();
    let key = resolve(&tenant, &SiteId::generate(), "");

    assert!(store.get(&key).await.unwrap().is_none());
}

#[tokio::test]
#[ignore]
async fn test_s3_missing_bucket_is_error() {
    let _available = skip_if_none!(minio_store().await);
    let store = S3BlobStore::new(create_minio_client(), "proxyhost-does-not-exist");

    assert!(store.check().await.is_err());
}

// =============================================================================
// Router Against MinIO
// =============================================================================

#[tokio::test]
#[ignore]
async fn test_publish_then_serve_with_s3() {
    let store = skip_if_none!(minio_store().await);
    let router = create_router(store, RouterConfig::new().with_tracing(false));

    let html = "<!doctype html><p>served from minio</p>";
    let response = send(router.clone(), "POST", "/api/sites/real-tenant", Body::from(html)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    let url = json["url"].as_str().unwrap().to_string();

    let response = get(router.clone(), &url).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header(&response, "content-type"),
        Some("text/html; charset=utf-8")
    );
    assert_eq!(body_string(response).await, html);

    let response = get(router, &format!("{}missing.png", url)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

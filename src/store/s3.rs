use async_trait::async_trait;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;

use super::{BlobStore, StoredObject};
use crate::error::StoreError;
use crate::site::{StorageKey, DEFAULT_MEDIA_TYPE};

/// S3-backed implementation of `BlobStore`.
///
/// Storage keys are used verbatim as object keys within a single bucket.
/// Works with AWS S3 and S3-compatible services (MinIO, R2, etc.).
#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
    identifier: String,
}

impl S3BlobStore {
    /// Create a store for the given bucket.
    ///
    /// No request is made here; use [`S3BlobStore::check`] to verify access.
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        let bucket = bucket.into();
        let identifier = format!("s3://{}", bucket);
        Self {
            client,
            bucket,
            identifier,
        }
    }

    /// Get the bucket name.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Verify the bucket exists and is reachable with the current credentials.
    pub async fn check(&self) -> Result<(), StoreError> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(classify_sdk_error)?;
        Ok(())
    }
}

/// Map an SDK failure onto a store error.
///
/// Dispatch failures and timeouts never reached S3 and are reported as
/// connection errors; everything else is an S3 error.
fn classify_sdk_error<E, R>(err: SdkError<E, R>) -> StoreError
where
    SdkError<E, R>: std::error::Error,
{
    match err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
            StoreError::Connection(err.to_string())
        }
        _ => StoreError::S3(err.to_string()),
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn get(&self, key: &StorageKey) -> Result<Option<StoredObject>, StoreError> {
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key.as_str())
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                let is_no_such_key = e
                    .as_service_error()
                    .map(|se| se.is_no_such_key())
                    .unwrap_or(false);

                // Some S3-compatible services answer a bare 404 without a NoSuchKey code
                let status_is_404 = e
                    .raw_response()
                    .map(|r| r.status().as_u16() == 404)
                    .unwrap_or(false);

                if is_no_such_key || status_is_404 {
                    return Ok(None);
                }

                return Err(classify_sdk_error(e));
            }
        };

        let content_type = output
            .content_type()
            .unwrap_or(DEFAULT_MEDIA_TYPE)
            .to_string();

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?
            .into_bytes();

        Ok(Some(StoredObject { data, content_type }))
    }

    async fn put(
        &self,
        key: &StorageKey,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), StoreError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key.as_str())
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(classify_sdk_error)?;
        Ok(())
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}

/// Create an S3 client with optional custom endpoint and region.
///
/// Use a custom endpoint for S3-compatible services like MinIO:
/// ```ignore
/// let client = create_s3_client(Some("http://localhost:9000"), "us-east-1").await;
/// ```
///
/// For AWS S3, pass `None` to use the default endpoint:
/// ```ignore
/// let client = create_s3_client(None, "us-east-1").await;
/// ```
pub async fn create_s3_client(endpoint_url: Option<&str>, region: &str) -> Client {
    let region = aws_config::Region::new(region.to_string());
    let mut config_loader =
        aws_config::defaults(aws_config::BehaviorVersion::latest()).region(region);

    if let Some(endpoint) = endpoint_url {
        config_loader = config_loader.endpoint_url(endpoint);
    }

    let sdk_config = config_loader.load().await;

    // S3-compatible services generally need path-style addressing
    let s3_config = if endpoint_url.is_some() {
        aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build()
    } else {
        aws_sdk_s3::config::Builder::from(&sdk_config).build()
    };

    Client::from_conf(s3_config)
}

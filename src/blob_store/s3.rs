/// S3-compatible blob storage backend
use crate::blob_store::{BlobBackend, StoredBlob, DEFAULT_CONTENT_TYPE};
use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::sync::Arc;
use tracing::{debug, error, info};

/// S3 blob storage backend
///
/// Supports AWS S3 and S3-compatible storage providers (MinIO, DigitalOcean Spaces, etc.)
#[derive(Clone)]
pub struct S3BlobBackend {
    client: Arc<Client>,
    bucket: String,
}

/// Configuration for S3 storage
#[derive(Debug, Clone)]
pub struct S3Config {
    /// S3 bucket name
    pub bucket: String,

    /// AWS region (e.g., "us-east-1")
    pub region: String,

    /// Custom endpoint for S3-compatible services
    /// Example: "http://localhost:9000"
    pub endpoint: Option<String>,

    pub access_key_id: String,
    pub secret_access_key: String,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: "overstat".to_string(),
            region: "us-east-1".to_string(),
            endpoint: None,
            access_key_id: String::new(),
            secret_access_key: String::new(),
        }
    }
}

impl S3BlobBackend {
    /// Create a new S3 blob backend
    pub async fn new(config: S3Config) -> ApiResult<Self> {
        info!(
            "Initializing S3 blob storage (bucket: {}, region: {})",
            config.bucket, config.region
        );

        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None, // session token
            None, // expiration
            "overstat",
        );

        let aws_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        let mut s3_config_builder = S3ConfigBuilder::from(&aws_config);

        if let Some(endpoint) = &config.endpoint {
            debug!("Using custom S3 endpoint: {}", endpoint);
            // MinIO and friends need path-style addressing
            s3_config_builder = s3_config_builder
                .endpoint_url(endpoint)
                .force_path_style(true);
        }

        let client = Client::from_conf(s3_config_builder.build());

        info!("✓ S3 blob storage initialized");

        Ok(Self {
            client: Arc::new(client),
            bucket: config.bucket,
        })
    }
}

#[async_trait]
impl BlobBackend for S3BlobBackend {
    fn prefix(&self) -> &'static str {
        "s3"
    }

    async fn put(&self, name: &str, data: Vec<u8>, content_type: &str) -> ApiResult<()> {
        debug!(
            "Uploading blob to S3: {}/{} ({} bytes, type: {})",
            self.bucket,
            name,
            data.len(),
            content_type
        );

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(name)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to upload blob to S3: {}", e);
                ApiError::BlobStorage(format!("S3 upload failed: {}", e))
            })?;

        Ok(())
    }

    async fn get(&self, name: &str) -> ApiResult<Option<StoredBlob>> {
        match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(name)
            .send()
            .await
        {
            Ok(response) => {
                let content_type = response
                    .content_type()
                    .unwrap_or(DEFAULT_CONTENT_TYPE)
                    .to_string();
                let data = response
                    .body
                    .collect()
                    .await
                    .map_err(|e| {
                        error!("Failed to read S3 object body: {}", e);
                        ApiError::BlobStorage(format!("Failed to read S3 object: {}", e))
                    })?
                    .into_bytes()
                    .to_vec();

                Ok(Some(StoredBlob { data, content_type }))
            }
            Err(e) => {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    debug!("Blob not found in S3: {}", name);
                    Ok(None)
                } else {
                    error!("Failed to download blob from S3: {}", e);
                    Err(ApiError::BlobStorage(format!("S3 download failed: {}", e)))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_s3_config_default() {
        let config = S3Config::default();
        assert_eq!(config.bucket, "overstat");
        assert_eq!(config.region, "us-east-1");
        assert!(config.endpoint.is_none());
    }

    #[tokio::test]
    async fn test_backend_prefix() {
        let backend = S3BlobBackend::new(S3Config {
            endpoint: Some("http://localhost:9000".to_string()),
            access_key_id: "minio".to_string(),
            secret_access_key: "minio123".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

        assert_eq!(backend.prefix(), "s3");
        assert_eq!(backend.bucket, "overstat");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error_not_a_miss() {
        let backend = S3BlobBackend::new(S3Config {
            endpoint: Some("http://127.0.0.1:1".to_string()),
            access_key_id: "minio".to_string(),
            secret_access_key: "minio123".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

        let result = backend.get("missing").await;
        assert!(matches!(result, Err(ApiError::BlobStorage(_))));
    }
}

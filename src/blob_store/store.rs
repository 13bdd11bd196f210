/// Blob Store Manager
///
/// Names uploads, hands them to the configured backend and turns the
/// generated name into a logical path.
use crate::{
    blob_store::{disk::DiskBlobBackend, s3::{S3BlobBackend, S3Config}, BlobBackend, StoredBlob},
    config::{BlobstoreConfig, StorageConfig},
    error::ApiResult,
};
use std::sync::Arc;
use uuid::Uuid;

/// Main blob store manager
#[derive(Clone)]
pub struct BlobStore {
    bucket: String,
    backend: Arc<dyn BlobBackend>,
}

impl BlobStore {
    /// Create a blob store for the configured backend
    pub async fn new(config: &StorageConfig) -> ApiResult<Self> {
        let backend: Arc<dyn BlobBackend> = match &config.blobstore {
            BlobstoreConfig::Disk { location } => {
                Arc::new(DiskBlobBackend::new(location.clone(), &config.bucket))
            }
            BlobstoreConfig::S3 {
                region,
                access_key_id,
                secret_access_key,
                endpoint,
            } => Arc::new(
                S3BlobBackend::new(S3Config {
                    bucket: config.bucket.clone(),
                    region: region.clone(),
                    endpoint: endpoint.clone(),
                    access_key_id: access_key_id.clone(),
                    secret_access_key: secret_access_key.clone(),
                })
                .await?,
            ),
        };

        Ok(Self::with_backend(config.bucket.clone(), backend))
    }

    /// Create a blob store over an already constructed backend
    pub fn with_backend(bucket: impl Into<String>, backend: Arc<dyn BlobBackend>) -> Self {
        Self {
            bucket: bucket.into(),
            backend,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Store bytes under a freshly generated name
    ///
    /// Returns the logical path `/{prefix}/{bucket}/{name}`.
    pub async fn store(&self, data: Vec<u8>, content_type: &str) -> ApiResult<String> {
        let name = Self::generate_name();
        let size = data.len();

        self.backend.put(&name, data, content_type).await?;

        tracing::debug!(
            "Stored blob {} in bucket {} ({} bytes, type: {})",
            name,
            self.bucket,
            size,
            content_type
        );

        Ok(self.logical_path(&name))
    }

    /// Read a blob back by its generated name
    pub async fn fetch(&self, name: &str) -> ApiResult<Option<StoredBlob>> {
        self.backend.get(name).await
    }

    /// Logical path for a name in this store's bucket
    pub fn logical_path(&self, name: &str) -> String {
        format!("/{}/{}/{}", self.backend.prefix(), self.bucket, name)
    }

    /// Random v4 UUID, so concurrent uploads never share a name
    fn generate_name() -> String {
        Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::tempdir;

    fn disk_store(dir: &std::path::Path) -> BlobStore {
        BlobStore::with_backend(
            "overstat",
            Arc::new(DiskBlobBackend::new(dir.to_path_buf(), "overstat")),
        )
    }

    #[tokio::test]
    async fn test_store_returns_logical_path() {
        let dir = tempdir().unwrap();
        let store = disk_store(dir.path());

        let path = store.store(b"screenshot".to_vec(), "image/png").await.unwrap();

        assert!(path.starts_with("/fs/overstat/"));
        let name = path.rsplit('/').next().unwrap();
        assert!(Uuid::parse_str(name).is_ok());

        let blob = store.fetch(name).await.unwrap().unwrap();
        assert_eq!(blob.data, b"screenshot");
        assert_eq!(blob.content_type, "image/png");
    }

    #[tokio::test]
    async fn test_concurrent_stores_get_distinct_names() {
        let dir = tempdir().unwrap();
        let store = disk_store(dir.path());

        let mut handles = Vec::new();
        for i in 0..32u8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.store(vec![i], "image/png").await.unwrap()
            }));
        }

        let mut paths = HashSet::new();
        for handle in handles {
            paths.insert(handle.await.unwrap());
        }
        assert_eq!(paths.len(), 32);
    }

    #[tokio::test]
    async fn test_new_builds_disk_backend_from_config() {
        let dir = tempdir().unwrap();
        let config = StorageConfig {
            data_directory: dir.path().to_path_buf(),
            record_db: dir.path().join("results.sqlite"),
            bucket: "matches".to_string(),
            blobstore: BlobstoreConfig::Disk {
                location: dir.path().join("blobs"),
            },
        };

        let store = BlobStore::new(&config).await.unwrap();
        assert_eq!(store.bucket(), "matches");

        let path = store.store(b"x".to_vec(), "image/png").await.unwrap();
        assert!(path.starts_with("/fs/matches/"));
        assert!(dir.path().join("blobs").join("matches").exists());
    }
}

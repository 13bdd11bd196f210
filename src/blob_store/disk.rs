/// Disk-based blob storage backend
use crate::{
    blob_store::{BlobBackend, StoredBlob, DEFAULT_CONTENT_TYPE},
    error::{ApiError, ApiResult},
};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::{fs, io::AsyncWriteExt};

/// Disk storage backend
///
/// Stores each blob as `{location}/{bucket}/{name}` with its content type
/// kept in a `{name}.content-type` sidecar file.
#[derive(Clone)]
pub struct DiskBlobBackend {
    base_path: PathBuf,
}

impl DiskBlobBackend {
    /// Create a new disk storage backend rooted at `location/bucket`
    pub fn new(location: PathBuf, bucket: &str) -> Self {
        Self {
            base_path: location.join(bucket),
        }
    }

    fn get_blob_path(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }

    fn get_content_type_path(&self, name: &str) -> PathBuf {
        self.base_path.join(format!("{}.content-type", name))
    }
}

#[async_trait]
impl BlobBackend for DiskBlobBackend {
    fn prefix(&self) -> &'static str {
        "fs"
    }

    async fn put(&self, name: &str, data: Vec<u8>, content_type: &str) -> ApiResult<()> {
        fs::create_dir_all(&self.base_path).await.map_err(|e| {
            ApiError::BlobStorage(format!("Failed to create blob directory: {}", e))
        })?;

        let mut file = fs::File::create(self.get_blob_path(name)).await.map_err(|e| {
            ApiError::BlobStorage(format!("Failed to open blob {} for writing: {}", name, e))
        })?;
        file.write_all(&data).await.map_err(|e| {
            ApiError::BlobStorage(format!("Failed to write blob {}: {}", name, e))
        })?;
        file.sync_all().await.map_err(|e| {
            ApiError::BlobStorage(format!("Failed to flush blob {}: {}", name, e))
        })?;

        fs::write(self.get_content_type_path(name), content_type)
            .await
            .map_err(|e| {
                ApiError::BlobStorage(format!("Failed to write content type for {}: {}", name, e))
            })?;

        Ok(())
    }

    async fn get(&self, name: &str) -> ApiResult<Option<StoredBlob>> {
        let data = match fs::read(self.get_blob_path(name)).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ApiError::BlobStorage(format!(
                    "Failed to read blob {}: {}",
                    name, e
                )))
            }
        };

        let content_type = match fs::read_to_string(self.get_content_type_path(name)).await {
            Ok(content_type) => content_type,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => DEFAULT_CONTENT_TYPE.to_string(),
            Err(e) => {
                return Err(ApiError::BlobStorage(format!(
                    "Failed to read content type for {}: {}",
                    name, e
                )))
            }
        };

        Ok(Some(StoredBlob { data, content_type }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_put_and_get_blob() {
        let dir = tempdir().unwrap();
        let backend = DiskBlobBackend::new(dir.path().to_path_buf(), "overstat");

        let data = b"fake png bytes".to_vec();
        backend.put("shot-1", data.clone(), "image/png").await.unwrap();

        let blob = backend.get("shot-1").await.unwrap().unwrap();
        assert_eq!(blob.data, data);
        assert_eq!(blob.content_type, "image/png");
    }

    #[tokio::test]
    async fn test_get_nonexistent_blob() {
        let dir = tempdir().unwrap();
        let backend = DiskBlobBackend::new(dir.path().to_path_buf(), "overstat");

        assert_eq!(backend.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_blobs_live_under_bucket_directory() {
        let dir = tempdir().unwrap();
        let backend = DiskBlobBackend::new(dir.path().to_path_buf(), "overstat");

        backend.put("shot-2", b"x".to_vec(), "image/jpeg").await.unwrap();

        assert!(dir.path().join("overstat").join("shot-2").exists());
        assert!(dir.path().join("overstat").join("shot-2.content-type").exists());
    }

    #[tokio::test]
    async fn test_missing_sidecar_falls_back_to_default_content_type() {
        let dir = tempdir().unwrap();
        let backend = DiskBlobBackend::new(dir.path().to_path_buf(), "overstat");

        backend.put("shot-4", b"x".to_vec(), "image/png").await.unwrap();
        std::fs::remove_file(dir.path().join("overstat").join("shot-4.content-type")).unwrap();

        let blob = backend.get("shot-4").await.unwrap().unwrap();
        assert_eq!(blob.content_type, DEFAULT_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn test_unreadable_sidecar_is_an_error() {
        let dir = tempdir().unwrap();
        let backend = DiskBlobBackend::new(dir.path().to_path_buf(), "overstat");

        backend.put("shot-5", b"x".to_vec(), "image/png").await.unwrap();
        // A directory in place of the sidecar fails with something other than NotFound
        let sidecar = dir.path().join("overstat").join("shot-5.content-type");
        std::fs::remove_file(&sidecar).unwrap();
        std::fs::create_dir(&sidecar).unwrap();

        let result = backend.get("shot-5").await;
        assert!(matches!(result, Err(ApiError::BlobStorage(_))));
    }

    #[tokio::test]
    async fn test_put_into_unwritable_location_fails() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        // The bucket directory would have to be created beneath a regular file
        let backend = DiskBlobBackend::new(blocker, "overstat");
        let result = backend.put("shot-3", b"x".to_vec(), "image/png").await;

        assert!(matches!(result, Err(ApiError::BlobStorage(_))));
    }
}

/// Blob Storage System
///
/// Holds uploaded screenshots as opaque byte blobs inside a single bucket.
/// Supports multiple backend implementations (disk, S3).

pub mod disk;
pub mod s3;
pub mod store;

pub use store::BlobStore;

use crate::error::ApiResult;
use async_trait::async_trait;

/// Content type recorded when an upload does not declare one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Blob storage backend trait
///
/// A backend is bound to one bucket; names are unique within it.
#[async_trait]
pub trait BlobBackend: Send + Sync {
    /// Leading segment of logical paths produced for this backend (e.g. "fs", "s3")
    fn prefix(&self) -> &'static str;

    /// Write a blob under the given name
    async fn put(&self, name: &str, data: Vec<u8>, content_type: &str) -> ApiResult<()>;

    /// Read a blob back by name
    async fn get(&self, name: &str) -> ApiResult<Option<StoredBlob>>;
}

/// Blob contents together with the content type it was written with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub data: Vec<u8>,
    pub content_type: String,
}

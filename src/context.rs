/// Application context and dependency injection
use crate::{
    blob_store::BlobStore,
    config::ServerConfig,
    db,
    error::{ApiError, ApiResult},
    record_store::MatchResultStore,
};
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub blob_store: Arc<BlobStore>,
    pub results: Arc<MatchResultStore>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> ApiResult<Self> {
        config.validate()?;

        Self::ensure_directories(&config).await?;

        let record_db =
            db::create_pool(&config.storage.record_db, db::DatabaseOptions::default()).await?;
        db::run_migrations(&record_db).await?;
        db::test_connection(&record_db).await?;

        let blob_store = BlobStore::new(&config.storage).await?;

        Ok(Self::from_parts(
            config,
            blob_store,
            MatchResultStore::new(record_db),
        ))
    }

    /// Assemble a context from already constructed services
    pub fn from_parts(
        config: ServerConfig,
        blob_store: BlobStore,
        results: MatchResultStore,
    ) -> Self {
        Self {
            config: Arc::new(config),
            blob_store: Arc::new(blob_store),
            results: Arc::new(results),
        }
    }

    /// Ensure required directories exist
    async fn ensure_directories(config: &ServerConfig) -> ApiResult<()> {
        tokio::fs::create_dir_all(&config.storage.data_directory)
            .await
            .map_err(|e| {
                ApiError::Internal(format!(
                    "Failed to create directory {:?}: {}",
                    config.storage.data_directory, e
                ))
            })?;

        if let crate::config::BlobstoreConfig::Disk { location } = &config.storage.blobstore {
            tokio::fs::create_dir_all(location).await?;
        }

        Ok(())
    }
}

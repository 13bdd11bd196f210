/// Configuration management for the Overstat results API
use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Default request body limit (5 MiB)
pub const DEFAULT_UPLOAD_LIMIT: usize = 5 * 1024 * 1024;

/// Default number of records returned by the list endpoint
pub const DEFAULT_LIST_LIMIT: u32 = 100;

/// Log filter used when RUST_LOG is unset
pub const DEFAULT_LOG_FILTER: &str = "overstat=debug,tower_http=debug";

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    /// Maximum multipart body size in bytes
    pub upload_limit: usize,
    /// Maximum number of records returned by a listing
    pub list_limit: u32,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_directory: PathBuf,
    pub record_db: PathBuf,
    pub bucket: String,
    pub blobstore: BlobstoreConfig,
}

/// Blob storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BlobstoreConfig {
    Disk {
        location: PathBuf,
    },
    S3 {
        region: String,
        access_key_id: String,
        secret_access_key: String,
        endpoint: Option<String>,
    },
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// Emit JSON log lines instead of human-readable ones
    pub json: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> ApiResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("OVERSTAT_HOSTNAME").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("OVERSTAT_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .map_err(|_| ApiError::Config("Invalid port number".to_string()))?;
        let upload_limit = env::var("OVERSTAT_UPLOAD_LIMIT")
            .unwrap_or_else(|_| DEFAULT_UPLOAD_LIMIT.to_string())
            .parse()
            .unwrap_or(DEFAULT_UPLOAD_LIMIT);
        let list_limit = env::var("OVERSTAT_LIST_LIMIT")
            .unwrap_or_else(|_| DEFAULT_LIST_LIMIT.to_string())
            .parse()
            .unwrap_or(DEFAULT_LIST_LIMIT);

        let data_directory: PathBuf = env::var("OVERSTAT_DATA_DIRECTORY")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let record_db = env::var("OVERSTAT_RECORD_DB_LOCATION")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_directory.join("results.sqlite"));
        let bucket = env::var("OVERSTAT_BLOB_BUCKET").unwrap_or_else(|_| "overstat".to_string());

        let s3_enabled = env::var("OVERSTAT_BLOBSTORE_S3_ENABLED")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .unwrap_or(false);
        let blobstore = if s3_enabled {
            BlobstoreConfig::S3 {
                region: env::var("OVERSTAT_BLOBSTORE_S3_REGION")
                    .unwrap_or_else(|_| "us-east-1".to_string()),
                access_key_id: env::var("OVERSTAT_BLOBSTORE_S3_ACCESS_KEY_ID")
                    .map_err(|_| ApiError::Config("S3 access key required".to_string()))?,
                secret_access_key: env::var("OVERSTAT_BLOBSTORE_S3_SECRET_ACCESS_KEY")
                    .map_err(|_| ApiError::Config("S3 secret key required".to_string()))?,
                endpoint: env::var("OVERSTAT_BLOBSTORE_S3_ENDPOINT").ok(),
            }
        } else {
            BlobstoreConfig::Disk {
                location: env::var("OVERSTAT_BLOBSTORE_DISK_LOCATION")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| data_directory.join("blobs")),
            }
        };

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());
        let log_json = env::var("OVERSTAT_LOG_FORMAT")
            .map(|format| format.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                upload_limit,
                list_limit,
            },
            storage: StorageConfig {
                data_directory,
                record_db,
                bucket,
                blobstore,
            },
            logging: LoggingConfig {
                level: log_level,
                json: log_json,
            },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> ApiResult<()> {
        if self.service.hostname.is_empty() {
            return Err(ApiError::Config("Hostname cannot be empty".to_string()));
        }

        if self.storage.bucket.is_empty() {
            return Err(ApiError::Config("Blob bucket cannot be empty".to_string()));
        }

        if self.service.upload_limit == 0 {
            return Err(ApiError::Config("Upload limit must be positive".to_string()));
        }

        if self.service.list_limit == 0 {
            return Err(ApiError::Config("List limit must be positive".to_string()));
        }

        Ok(())
    }

    /// Bind address for the HTTP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.service.hostname, self.service.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        let data_directory = PathBuf::from("./data");
        Self {
            service: ServiceConfig {
                hostname: "0.0.0.0".to_string(),
                port: 8080,
                upload_limit: DEFAULT_UPLOAD_LIMIT,
                list_limit: DEFAULT_LIST_LIMIT,
            },
            storage: StorageConfig {
                record_db: data_directory.join("results.sqlite"),
                bucket: "overstat".to_string(),
                blobstore: BlobstoreConfig::Disk {
                    location: data_directory.join("blobs"),
                },
                data_directory,
            },
            logging: LoggingConfig {
                level: DEFAULT_LOG_FILTER.to_string(),
                json: false,
            },
        }
    }
}

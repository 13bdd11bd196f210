/// Overstat - match result ingestion API
///
/// Accepts multipart match submissions, stores the attached screenshot in
/// blob storage and records the result in a SQLite-backed record store.

pub mod api;
pub mod blob_store;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod record_store;
pub mod server;

//! Object storage for photos, covers, and signed terms.
//!
//! [`ObjectStore`] is the seam used by the API: an S3-compatible bucket in
//! production ([`S3Store`], Cloudflare R2 by default) and [`MemoryStore`]
//! when no credentials are configured. There is no retry logic; a failed
//! call surfaces as [`StorageError`].

use std::time::Duration;

use async_trait::async_trait;

pub mod memory;
pub mod s3;

pub use memory::MemoryStore;
pub use s3::{S3Config, S3Store};

/// Default bucket when `R2_BUCKET` is not set.
pub const DEFAULT_BUCKET: &str = "tna-studio-media";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Storage configuration error: {0}")]
    Config(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Put, delete, and sign access to objects in one bucket.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload `bytes` under `key`, replacing any existing object.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StorageError>;

    /// Delete the object at `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// A time-limited GET URL for `key`.
    async fn presign_get(&self, key: &str, ttl: Duration) -> Result<String, StorageError>;

    /// Short name reported by the health endpoint.
    fn backend_name(&self) -> &'static str;
}

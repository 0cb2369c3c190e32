//! Object storage for Logbook event attachments.
//!
//! Events keep the storage keys of their files; the objects themselves
//! live in an object store. Removal is best-effort from the caller's point
//! of view, so the interface is deliberately small.

mod error;
mod memory;
mod s3;

pub use error::{BlobStoreError, BlobStoreResult};
pub use memory::MemoryObjectStore;
pub use s3::{AccessLevel, S3Config, S3ObjectStore};

use async_trait::async_trait;

/// Abstract object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Returns the name of the backend, for logs.
    fn store_name(&self) -> &'static str;

    /// Removes the object stored under `key`.
    ///
    /// Removing a key that does not exist succeeds.
    async fn remove(&self, key: &str) -> BlobStoreResult<()>;
}

//! ObjectStore trait for archive placement and pruning
//!
//! The trait is deliberately narrow: exactly the three store operations
//! the pipeline needs. The aws-sdk-s3 adapter lives in tnb-s3; tests mock
//! this trait instead of talking to a real store.

use async_trait::async_trait;
use jiff::Timestamp;

use crate::error::Result;

/// One object as seen by a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Full key including any namespace prefix
    pub key: String,
    /// Store-reported last-modified time; objects without one are never
    /// considered for deletion
    pub last_modified: Option<Timestamp>,
}

/// Abstract object store bound to one bucket
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `data` under `key`, overwriting any existing object
    async fn put_object(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()>;

    /// List every object under `prefix`, paging through the full listing
    async fn list_objects(&self, prefix: &str) -> Result<Vec<StoredObject>>;

    /// Delete the object at `key`
    async fn delete_object(&self, key: &str) -> Result<()>;
}

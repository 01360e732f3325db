use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// Object storage seam. Implementations take a sanitized key and return a
/// durable, publicly addressable URL on success.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Upload data under the given key, returning the durable URL
    async fn put(&self, key: &str, data: Bytes, content_type: Option<mime::Mime>)
        -> Result<String>;

    /// Get the storage type name
    fn storage_type(&self) -> &'static str;
}

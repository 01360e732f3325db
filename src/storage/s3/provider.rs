//! ObjectStorage implementation backed by an S3 bucket

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::StorageConfig;
use crate::error::{Result, StoreError};
use crate::storage::s3::client::Client;
use crate::storage::ObjectStorage;

pub struct S3Storage {
    client: Client,
}

impl S3Storage {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn put(
        &self,
        key: &str,
        data: Bytes,
        content_type: Option<mime::Mime>,
    ) -> Result<String> {
        // Misconfiguration fails before any network call
        if !self.client.has_credentials() {
            return Err(StoreError::CredentialsMissing.into());
        }

        self.client.put_object(key, data, content_type).await?;
        Ok(self.client.object_url(key))
    }

    fn storage_type(&self) -> &'static str {
        "s3"
    }
}

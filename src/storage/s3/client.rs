use std::time::Duration;
use urlencoding::encode;

use crate::config::StorageConfig;

/// S3 client bound to one bucket, region, and credential pair
#[derive(Debug, Clone)]
pub struct Client {
    access_key_id: String,
    secret_access_key: String,
    bucket: String,
    region: String,
    http: reqwest::Client,
}

impl Client {
    pub fn new(config: &StorageConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.put_timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            access_key_id: config.access_key_id.clone(),
            secret_access_key: config.secret_access_key.clone(),
            bucket: config.bucket.clone(),
            region: config.region.clone(),
            http,
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.access_key_id.is_empty() && !self.secret_access_key.is_empty()
    }

    pub fn host(&self) -> String {
        format!("{}.s3.{}.amazonaws.com", self.bucket, self.region)
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    pub(super) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Canonical URI for an object key: each segment percent-encoded,
    /// leading slash preserved
    pub fn canonical_uri(&self, key: &str) -> String {
        let encoded: Vec<String> = key
            .trim_start_matches('/')
            .split('/')
            .map(|segment| encode(segment).to_string())
            .collect();
        format!("/{}", encoded.join("/"))
    }

    /// Deterministic public URL for an object key
    pub fn object_url(&self, key: &str) -> String {
        format!("https://{}{}", self.host(), self.canonical_uri(key))
    }
}

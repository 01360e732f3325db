//! Object PUT operation on the S3 client

use bytes::Bytes;
use chrono::Utc;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE, HOST};

use crate::error::StoreError;
use crate::storage::s3::client::Client;
use crate::storage::s3::signer::{sha256_hex, Signer};

impl Client {
    /// Upload an object with a SigV4-signed PUT. The caller is responsible
    /// for checking credentials first; this always signs and sends.
    pub async fn put_object(
        &self,
        key: &str,
        data: Bytes,
        content_type: Option<mime::Mime>,
    ) -> Result<(), StoreError> {
        let host = self.host();
        let uri = self.canonical_uri(key);
        let amz_date = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
        let payload_hash = sha256_hex(&data);

        let authorization = Signer::new("PUT", &host, &uri, self.region(), &amz_date, &payload_hash)
            .authorization(self.access_key_id(), self.secret_access_key());

        let content_type = content_type.unwrap_or(mime::APPLICATION_OCTET_STREAM);

        let url = format!("https://{}{}", host, uri);
        let response = self
            .http()
            .put(&url)
            .header(HOST, header_value(&host)?)
            .header("x-amz-date", header_value(&amz_date)?)
            .header("x-amz-content-sha256", header_value(&payload_hash)?)
            .header(AUTHORIZATION, header_value(&authorization)?)
            .header(CONTENT_TYPE, header_value(content_type.as_ref())?)
            .body(data)
            .send()
            .await
            .map_err(|e| StoreError::TransportError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::TransportError(format!(
                "S3 PUT returned {}: {}",
                status, body
            )));
        }

        tracing::info!("Uploaded object to S3: {}", key);
        Ok(())
    }
}

fn header_value(value: &str) -> Result<HeaderValue, StoreError> {
    HeaderValue::from_str(value)
        .map_err(|e| StoreError::TransportError(format!("invalid header value: {}", e)))
}

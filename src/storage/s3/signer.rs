//! AWS Signature Version 4 signing for S3 requests.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SIGNED_HEADERS: &str = "host;x-amz-content-sha256;x-amz-date";

/// SigV4 signer for a single request. Signs the fixed header set
/// host, x-amz-content-sha256, x-amz-date.
pub struct Signer<'a> {
    method: &'a str,
    host: &'a str,
    /// Canonical URI: the percent-encoded object path, starting with '/'
    uri: &'a str,
    region: &'a str,
    /// Request timestamp in the form YYYYMMDD'T'HHMMSS'Z'
    amz_date: &'a str,
    /// Hex SHA-256 of the request payload
    payload_hash: &'a str,
}

impl<'a> Signer<'a> {
    pub fn new(
        method: &'a str,
        host: &'a str,
        uri: &'a str,
        region: &'a str,
        amz_date: &'a str,
        payload_hash: &'a str,
    ) -> Self {
        Self {
            method,
            host,
            uri,
            region,
            amz_date,
            payload_hash,
        }
    }

    fn date(&self) -> &str {
        &self.amz_date[..8]
    }

    fn credential_scope(&self) -> String {
        format!("{}/{}/s3/aws4_request", self.date(), self.region)
    }

    fn canonical_request(&self) -> String {
        [
            self.method,
            self.uri,
            "", // canonical query string
            &format!("host:{}", self.host),
            &format!("x-amz-content-sha256:{}", self.payload_hash),
            &format!("x-amz-date:{}", self.amz_date),
            "",
            SIGNED_HEADERS,
            self.payload_hash,
        ]
        .join("\n")
    }

    fn string_to_sign(&self) -> String {
        [
            ALGORITHM.to_string(),
            self.amz_date.to_string(),
            self.credential_scope(),
            sha256_hex(self.canonical_request().as_bytes()),
        ]
        .join("\n")
    }

    fn signing_key(&self, secret_key: &str) -> Vec<u8> {
        let date_key = hmac(format!("AWS4{}", secret_key).as_bytes(), self.date());
        let region_key = hmac(&date_key, self.region);
        let service_key = hmac(&region_key, "s3");
        hmac(&service_key, "aws4_request")
    }

    /// Build the Authorization header value
    pub fn authorization(&self, access_key_id: &str, secret_key: &str) -> String {
        let signing_key = self.signing_key(secret_key);
        let signature = hex::encode(hmac(&signing_key, &self.string_to_sign()));

        format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM,
            access_key_id,
            self.credential_scope(),
            SIGNED_HEADERS,
            signature
        )
    }
}

fn hmac(key: &[u8], data: &str) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

/// Hex-encoded SHA-256 digest
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

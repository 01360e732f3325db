use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::config::Config;
use crate::error::AuthError;
use crate::models::Claims;

struct CachedKeys {
    set: JwkSet,
    fetched_at: Instant,
}

/// Cached copy of the identity provider's signing keys. Populated lazily on
/// first use, refreshed when the TTL lapses or a token references an unknown
/// key id. Never fetched per request.
pub struct JwksCache {
    client: reqwest::Client,
    url: String,
    ttl: Duration,
    keys: RwLock<Option<CachedKeys>>,
}

impl JwksCache {
    pub fn new(url: String, ttl: Duration, fetch_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(fetch_timeout)
            .build()
            .unwrap_or_default();

        Self {
            client,
            url,
            ttl,
            keys: RwLock::new(None),
        }
    }

    /// Find the signing key matching the token's key id, refetching the key
    /// set once if it is stale or does not contain the id.
    pub async fn find_key(&self, kid: &str) -> Result<Jwk, AuthError> {
        let had_cached = {
            let cached = self.keys.read().await;
            match cached.as_ref() {
                Some(entry) if entry.fetched_at.elapsed() < self.ttl => {
                    if let Some(jwk) = entry.set.find(kid) {
                        return Ok(jwk.clone());
                    }
                    true
                }
                Some(_) => true,
                None => false,
            }
        };

        match self.refresh().await {
            Ok(set) => set.find(kid).cloned().ok_or(AuthError::UnknownKey),
            // A stale set we already hold still tells us the kid is unknown
            Err(e) if had_cached => {
                tracing::warn!("JWKS refresh failed, key id not in cached set: {}", e);
                Err(AuthError::UnknownKey)
            }
            Err(e) => Err(e),
        }
    }

    async fn refresh(&self) -> Result<JwkSet, AuthError> {
        let set: JwkSet = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| {
                tracing::error!("Failed to fetch JWKS from {}: {}", self.url, e);
                AuthError::InvalidToken
            })?
            .json()
            .await
            .map_err(|e| {
                tracing::error!("Failed to parse JWKS response: {}", e);
                AuthError::InvalidToken
            })?;

        let mut cached = self.keys.write().await;
        *cached = Some(CachedKeys {
            set: set.clone(),
            fetched_at: Instant::now(),
        });

        Ok(set)
    }

    #[cfg(test)]
    async fn preload(&self, set: JwkSet) {
        let mut cached = self.keys.write().await;
        *cached = Some(CachedKeys {
            set,
            fetched_at: Instant::now(),
        });
    }
}

/// Verifies bearer tokens against the identity provider's published keys
pub struct TokenVerifier {
    jwks: JwksCache,
    audience: String,
    issuer: String,
}

impl TokenVerifier {
    pub fn new(config: &Config) -> Self {
        let jwks = JwksCache::new(
            config.jwks_url(),
            Duration::from_secs(config.auth.jwks_ttl_secs),
            Duration::from_secs(config.auth.jwks_timeout_secs),
        );

        Self {
            jwks,
            audience: config.auth.audience.clone(),
            issuer: config.issuer(),
        }
    }

    /// Decode and validate a raw bearer token: signature against the JWKS key
    /// named by the token header, plus audience, issuer, and expiry.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|_| AuthError::InvalidToken)?;
        let kid = header.kid.ok_or(AuthError::InvalidToken)?;

        let jwk = self.jwks.find_key(&kid).await?;
        let key = DecodingKey::from_jwk(&jwk).map_err(|_| AuthError::InvalidToken)?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);

        let data = decode::<Claims>(token, &key, &validation).map_err(map_jwt_error)?;
        Ok(data.claims)
    }
}

fn map_jwt_error(e: jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;

    match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::InvalidSignature => AuthError::BadSignature,
        ErrorKind::InvalidAudience | ErrorKind::InvalidIssuer => AuthError::InvalidClaims,
        _ => AuthError::InvalidToken,
    }
}

use serde::{Deserialize, Serialize};

/// JWT claims extracted from a verified bearer token.
/// Transient, per-request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // subject, becomes the owner id
    #[serde(default)]
    pub aud: Option<serde_json::Value>,
    #[serde(default)]
    pub iss: Option<String>,
    pub exp: usize, // expiration time
}

/// Authenticated caller injected into request extensions by the auth middleware
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
}

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::{AppError, AuthError};
use crate::models::AuthUser;
use crate::AppState;

/// Authentication middleware.
/// Extracts the bearer token, verifies it against the identity provider's
/// key set, and injects the authenticated subject into request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = extract_bearer(auth_header)?;
    let claims = state.verifier.verify(token).await?;

    request.extensions_mut().insert(AuthUser { id: claims.sub });

    Ok(next.run(request).await)
}

/// Strict bearer-token extraction. Malformed headers fail fast, before any
/// network or cryptographic work.
fn extract_bearer(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingHeader)?;
    let parts: Vec<&str> = header.split_whitespace().collect();

    if parts.is_empty() || !parts[0].eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedHeader(
            "Authorization header must start with Bearer",
        ));
    }
    if parts.len() == 1 {
        return Err(AuthError::MalformedHeader("Token not found"));
    }
    if parts.len() > 2 {
        return Err(AuthError::MalformedHeader(
            "Authorization header must be Bearer token",
        ));
    }

    Ok(parts[1])
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication failures. Always map to 401.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Authorization header is expected")]
    MissingHeader,

    #[error("{0}")]
    MalformedHeader(&'static str),

    #[error("Unable to find appropriate key")]
    UnknownKey,

    #[error("Token signature verification failed")]
    BadSignature,

    #[error("Token is expired")]
    Expired,

    #[error("Incorrect claims. Check the audience and issuer")]
    InvalidClaims,

    #[error("Unable to parse authentication token")]
    InvalidToken,
}

impl AuthError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingHeader => "authorization_header_missing",
            AuthError::MalformedHeader(_) => "invalid_header",
            AuthError::UnknownKey => "unknown_key",
            AuthError::BadSignature => "bad_signature",
            AuthError::Expired => "token_expired",
            AuthError::InvalidClaims => "invalid_claims",
            AuthError::InvalidToken => "invalid_token",
        }
    }
}

/// Upload input rejections. Always map to 400 and run before any network I/O.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("No file part in the request")]
    MissingFile,

    #[error("File type not allowed")]
    DisallowedType,

    #[error("File size exceeds maximum limit")]
    TooLarge,
}

impl ValidationError {
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingFile => "missing_file",
            ValidationError::DisallowedType => "file_type_not_allowed",
            ValidationError::TooLarge => "file_too_large",
        }
    }
}

/// Object store failures. Always map to 500, never retried here.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage credentials are not configured")]
    CredentialsMissing,

    #[error("Storage request failed: {0}")]
    TransportError(String),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::CredentialsMissing => "storage_credentials_missing",
            StoreError::TransportError(_) => "storage_unavailable",
        }
    }
}

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Machine-readable error body: stable code plus human-readable description.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub description: String,
}

impl ErrorBody {
    pub fn new(code: &str, description: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            description: description.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, description) = match &self {
            AppError::Auth(e) => {
                tracing::warn!("Auth failure: {}", e);
                (StatusCode::UNAUTHORIZED, e.code(), e.to_string())
            }
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, e.code(), e.to_string()),
            AppError::Store(e) => {
                tracing::error!("Storage error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.code(), e.to_string())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    "Database error occurred".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorBody::new(code, description));
        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

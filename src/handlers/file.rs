use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    Extension, Json,
};
use bytes::{Bytes, BytesMut};

use crate::error::{AppError, Result, ValidationError};
use crate::models::{AuthUser, FileListResponse, FileQuery, UploadResponse};
use crate::services::{validate, FileService};
use crate::AppState;

/// Upload a file
/// POST /api/upload
pub async fn upload_file(
    State(state): State<AppState>,
    Extension(current_user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>)> {
    let mut file_name: Option<String> = None;
    let mut content_type: Option<mime::Mime> = None;
    let mut data: Option<Bytes> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to process multipart: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        file_name = field.file_name().map(|s| s.to_string());
        content_type = field.content_type().and_then(|s| s.parse().ok());

        // Measure the payload as it arrives; an early-terminated stream is a
        // client error, and anything past the ceiling is rejected without
        // buffering the rest.
        let mut buf = BytesMut::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read file chunk: {}", e)))?
        {
            if buf.len() + chunk.len() > validate::MAX_FILE_SIZE {
                return Err(ValidationError::TooLarge.into());
            }
            buf.extend_from_slice(&chunk);
        }

        data = Some(buf.freeze());
    }

    let data = data.ok_or(ValidationError::MissingFile)?;
    let file_name = file_name.ok_or(ValidationError::MissingFile)?;

    let response = FileService::upload(
        &state.db,
        state.storage.as_ref(),
        state.cache.as_ref(),
        &current_user.id,
        &file_name,
        content_type,
        data,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// List the caller's files, newest first
/// GET /api/files?page=&per_page=
pub async fn list_files(
    State(state): State<AppState>,
    Extension(current_user): Extension<AuthUser>,
    Query(query): Query<FileQuery>,
) -> Result<Json<FileListResponse>> {
    let listing = FileService::list(
        &state.db,
        state.cache.as_ref(),
        &current_user.id,
        query.page,
        query.per_page,
    )
    .await?;

    Ok(Json(listing))
}

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// File metadata record. Exists if and only if the object was confirmed
/// stored; the row is only written after a successful storage put.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FileRecord {
    pub id: i64,
    pub owner_id: String,
    pub filename: String,
    pub storage_url: String,
    pub size_bytes: i64,
    pub uploaded_at: String,
}

/// One entry in a file listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileItem {
    pub id: i64,
    pub filename: String,
    pub url: String,
    pub upload_date: String,
    pub file_size: i64,
}

impl From<FileRecord> for FileItem {
    fn from(record: FileRecord) -> Self {
        Self {
            id: record.id,
            filename: record.filename,
            url: record.storage_url,
            upload_date: record.uploaded_at,
            file_size: record.size_bytes,
        }
    }
}

/// Paginated file listing response. Also the unit cached per (owner, page).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileListResponse {
    pub files: Vec<FileItem>,
    pub total: i64,
    pub pages: i64,
    pub current_page: i64,
}

/// Successful upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub url: String,
    pub file_id: i64,
}

/// Listing query parameters
#[derive(Debug, Deserialize)]
pub struct FileQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

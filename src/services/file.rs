use bytes::Bytes;

use crate::cache::PageCache;
use crate::db::Database;
use crate::error::{Result, ValidationError};
use crate::models::{FileListResponse, UploadResponse};
use crate::services::repository::FileRepository;
use crate::services::validate;
use crate::storage::ObjectStorage;

const DEFAULT_PER_PAGE: i64 = 20;
const MAX_PER_PAGE: i64 = 100;

/// Orchestrates the upload and list request pipelines
pub struct FileService;

impl FileService {
    /// Upload pipeline: validate, store the bytes, persist metadata,
    /// invalidate the owner's cached listings.
    ///
    /// The metadata row is written only after storage confirms the put. If
    /// the insert then fails the object is durably stored but orphaned; that
    /// condition is logged for out-of-band reconciliation and the request
    /// still fails, so the client never believes the upload succeeded.
    pub async fn upload(
        db: &Database,
        storage: &dyn ObjectStorage,
        cache: &dyn PageCache,
        owner_id: &str,
        filename: &str,
        content_type: Option<mime::Mime>,
        data: Bytes,
    ) -> Result<UploadResponse> {
        // Rejections happen before any network I/O
        validate::check_filename(filename)?;
        validate::check_size(data.len())?;

        let key = validate::sanitize_filename(filename);
        if key.is_empty() {
            return Err(ValidationError::DisallowedType.into());
        }

        // Size is measured from the received payload, never a client header
        let size_bytes = data.len() as i64;

        let url = storage.put(&key, data, content_type).await?;

        let record = match FileRepository::insert(db, owner_id, &key, &url, size_bytes).await {
            Ok(record) => record,
            Err(e) => {
                tracing::error!(
                    "Orphaned object: {} stored at {} for owner {} but metadata insert failed: {}",
                    key,
                    url,
                    owner_id,
                    e
                );
                return Err(e);
            }
        };

        // Staleness here is bounded by the TTL; the repository stays authoritative
        if let Err(e) = cache.invalidate(owner_id).await {
            tracing::warn!("Failed to invalidate listing cache for {}: {}", owner_id, e);
        }

        Ok(UploadResponse {
            message: "File uploaded successfully".to_string(),
            url: record.storage_url,
            file_id: record.id,
        })
    }

    /// List pipeline: cache-aside read of the owner's files
    pub async fn list(
        db: &Database,
        cache: &dyn PageCache,
        owner_id: &str,
        page: Option<i64>,
        per_page: Option<i64>,
    ) -> Result<FileListResponse> {
        let page = page.unwrap_or(1).max(1);
        let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);

        match cache.get(owner_id, page).await {
            Ok(Some(hit)) => return Ok(hit),
            Ok(None) => {}
            Err(e) => tracing::warn!("Listing cache read failed for {}: {}", owner_id, e),
        }

        let result = FileRepository::list_by_owner(db, owner_id, page, per_page).await?;

        if let Err(e) = cache.set(owner_id, page, result.clone()).await {
            tracing::warn!("Listing cache fill failed for {}: {}", owner_id, e);
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::error::{AppError, StoreError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct MockStorage {
        calls: AtomicUsize,
        fail: bool,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ObjectStorage for MockStorage {
        async fn put(
            &self,
            key: &str,
            _data: Bytes,
            _content_type: Option<mime::Mime>,
        ) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(StoreError::TransportError("connection reset".to_string()).into());
            }
            Ok(format!(
                "https://my-bucket.s3.us-east-1.amazonaws.com/{}",
                key
            ))
        }

        fn storage_type(&self) -> &'static str {
            "mock"
        }
    }

    struct FailingCache;

    #[async_trait]
    impl PageCache for FailingCache {
        async fn get(&self, _owner_id: &str, _page: i64) -> Result<Option<FileListResponse>> {
            Err(AppError::Internal("cache backend down".to_string()))
        }

        async fn set(
            &self,
            _owner_id: &str,
            _page: i64,
            _payload: FileListResponse,
        ) -> Result<()> {
            Err(AppError::Internal("cache backend down".to_string()))
        }

        async fn invalidate(&self, _owner_id: &str) -> Result<()> {
            Err(AppError::Internal("cache backend down".to_string()))
        }
    }

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    fn cache() -> MemoryCache {
        MemoryCache::new(Duration::from_secs(300))
    }

    #[tokio::test]
    async fn upload_stores_persists_and_lists_newest_first() {
        let db = setup_db().await;
        let storage = MockStorage::new();
        let cache = cache();

        let response = FileService::upload(
            &db,
            &storage,
            &cache,
            "u1",
            "report.pdf",
            Some(mime::APPLICATION_PDF),
            Bytes::from(vec![0u8; 2048]),
        )
        .await
        .unwrap();

        assert_eq!(response.message, "File uploaded successfully");
        assert_eq!(
            response.url,
            "https://my-bucket.s3.us-east-1.amazonaws.com/report.pdf"
        );
        assert_eq!(response.file_id, 1);

        let listing = FileService::list(&db, &cache, "u1", None, None).await.unwrap();
        assert_eq!(listing.total, 1);
        assert_eq!(listing.files[0].filename, "report.pdf");
        assert_eq!(listing.files[0].file_size, 2048);
    }

    #[tokio::test]
    async fn disallowed_type_makes_no_store_call_and_no_record() {
        let db = setup_db().await;
        let storage = MockStorage::new();
        let cache = cache();

        let err = FileService::upload(
            &db,
            &storage,
            &cache,
            "u1",
            "malware.exe",
            None,
            Bytes::from_static(b"MZ"),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            AppError::Validation(ValidationError::DisallowedType)
        ));
        assert_eq!(storage.call_count(), 0);

        let listing = FileService::list(&db, &cache, "u1", None, None).await.unwrap();
        assert_eq!(listing.total, 0);
    }

    #[tokio::test]
    async fn oversize_payload_is_rejected_before_storage() {
        let db = setup_db().await;
        let storage = MockStorage::new();
        let cache = cache();

        let err = FileService::upload(
            &db,
            &storage,
            &cache,
            "u1",
            "big.txt",
            None,
            Bytes::from(vec![0u8; validate::MAX_FILE_SIZE + 1]),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Validation(ValidationError::TooLarge)));
        assert_eq!(storage.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_filename_is_missing_file() {
        let db = setup_db().await;
        let storage = MockStorage::new();
        let cache = cache();

        let err = FileService::upload(&db, &storage, &cache, "u1", "", None, Bytes::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Validation(ValidationError::MissingFile)
        ));
        assert_eq!(storage.call_count(), 0);
    }

    #[tokio::test]
    async fn store_failure_creates_no_record() {
        let db = setup_db().await;
        let storage = MockStorage::failing();
        let cache = cache();

        let err = FileService::upload(
            &db,
            &storage,
            &cache,
            "u1",
            "report.pdf",
            None,
            Bytes::from_static(b"data"),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            AppError::Store(StoreError::TransportError(_))
        ));

        let listing = FileService::list(&db, &cache, "u1", None, None).await.unwrap();
        assert_eq!(listing.total, 0);
    }

    #[tokio::test]
    async fn insert_failure_after_store_success_surfaces_error() {
        let db = setup_db().await;
        let storage = MockStorage::new();
        let cache = cache();

        // Force the metadata insert to fail after storage succeeds
        sqlx::query("DROP TABLE files")
            .execute(db.pool())
            .await
            .unwrap();

        let err = FileService::upload(
            &db,
            &storage,
            &cache,
            "u1",
            "report.pdf",
            None,
            Bytes::from_static(b"data"),
        )
        .await
        .unwrap_err();

        // The object was stored (orphaned) but the client still sees a failure
        assert_eq!(storage.call_count(), 1);
        assert!(matches!(err, AppError::Database(_)));
    }

    #[tokio::test]
    async fn consecutive_lists_hit_the_cache() {
        let db = setup_db().await;
        let storage = MockStorage::new();
        let cache = cache();

        FileService::upload(
            &db,
            &storage,
            &cache,
            "u1",
            "a.txt",
            None,
            Bytes::from_static(b"x"),
        )
        .await
        .unwrap();

        let first = FileService::list(&db, &cache, "u1", Some(1), None).await.unwrap();

        // A write that bypasses the service does not invalidate; the second
        // read must come back verbatim from the cache.
        FileRepository::insert(&db, "u1", "sneaky.txt", "https://x/s", 1)
            .await
            .unwrap();

        let second = FileService::list(&db, &cache, "u1", Some(1), None).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn upload_invalidates_cached_listing() {
        let db = setup_db().await;
        let storage = MockStorage::new();
        let cache = cache();

        FileService::upload(
            &db,
            &storage,
            &cache,
            "u1",
            "old.txt",
            None,
            Bytes::from_static(b"x"),
        )
        .await
        .unwrap();

        // Warm the cache
        FileService::list(&db, &cache, "u1", Some(1), None).await.unwrap();

        FileService::upload(
            &db,
            &storage,
            &cache,
            "u1",
            "new.txt",
            None,
            Bytes::from_static(b"y"),
        )
        .await
        .unwrap();

        let listing = FileService::list(&db, &cache, "u1", Some(1), None).await.unwrap();
        assert_eq!(listing.total, 2);
        assert_eq!(listing.files[0].filename, "new.txt");
    }

    #[tokio::test]
    async fn cache_failures_never_block_requests() {
        let db = setup_db().await;
        let storage = MockStorage::new();
        let cache = FailingCache;

        FileService::upload(
            &db,
            &storage,
            &cache,
            "u1",
            "a.txt",
            None,
            Bytes::from_static(b"x"),
        )
        .await
        .unwrap();

        let listing = FileService::list(&db, &cache, "u1", None, None).await.unwrap();
        assert_eq!(listing.total, 1);
    }

    #[tokio::test]
    async fn filename_is_sanitized_before_storage_and_persistence() {
        let db = setup_db().await;
        let storage = MockStorage::new();
        let cache = cache();

        let response = FileService::upload(
            &db,
            &storage,
            &cache,
            "u1",
            "../secret dir/my report.pdf",
            None,
            Bytes::from_static(b"data"),
        )
        .await
        .unwrap();

        assert_eq!(
            response.url,
            "https://my-bucket.s3.us-east-1.amazonaws.com/my_report.pdf"
        );

        let listing = FileService::list(&db, &cache, "u1", None, None).await.unwrap();
        assert_eq!(listing.files[0].filename, "my_report.pdf");
    }
}

use chrono::Utc;

use crate::db::Database;
use crate::error::Result;
use crate::models::{FileItem, FileListResponse, FileRecord};

/// Metadata repository for file records
pub struct FileRepository;

impl FileRepository {
    /// Insert a record for a stored object. Assigns the identifier and the
    /// upload timestamp. Runs in a transaction; any failure rolls back.
    pub async fn insert(
        db: &Database,
        owner_id: &str,
        filename: &str,
        storage_url: &str,
        size_bytes: i64,
    ) -> Result<FileRecord> {
        let uploaded_at = Utc::now().to_rfc3339();

        let mut tx = db.pool().begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO files (owner_id, filename, storage_url, size_bytes, uploaded_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(owner_id)
        .bind(filename)
        .bind(storage_url)
        .bind(size_bytes)
        .bind(&uploaded_at)
        .execute(tx.as_mut())
        .await?;

        let id = result.last_insert_rowid();
        tx.commit().await?;

        Ok(FileRecord {
            id,
            owner_id: owner_id.to_string(),
            filename: filename.to_string(),
            storage_url: storage_url.to_string(),
            size_bytes,
            uploaded_at,
        })
    }

    /// List an owner's files, most recent first, ties broken by id descending.
    /// Returns the requested page plus total and page counts.
    pub async fn list_by_owner(
        db: &Database,
        owner_id: &str,
        page: i64,
        per_page: i64,
    ) -> Result<FileListResponse> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM files WHERE owner_id = ?")
            .bind(owner_id)
            .fetch_one(db.pool())
            .await?;

        let offset = (page - 1) * per_page;
        let records: Vec<FileRecord> = sqlx::query_as(
            r#"
            SELECT * FROM files WHERE owner_id = ?
            ORDER BY uploaded_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(owner_id)
        .bind(per_page)
        .bind(offset)
        .fetch_all(db.pool())
        .await?;

        let pages = if total == 0 {
            0
        } else {
            (total + per_page - 1) / per_page
        };

        Ok(FileListResponse {
            files: records.into_iter().map(FileItem::from).collect(),
            total,
            pages,
            current_page: page,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_id_and_timestamp() {
        let db = setup_db().await;

        let record = FileRepository::insert(&db, "u1", "report.pdf", "https://x/report.pdf", 2048)
            .await
            .unwrap();

        assert_eq!(record.id, 1);
        assert_eq!(record.owner_id, "u1");
        assert_eq!(record.size_bytes, 2048);
        assert!(!record.uploaded_at.is_empty());
    }

    #[tokio::test]
    async fn listing_is_owner_scoped() {
        let db = setup_db().await;
        FileRepository::insert(&db, "u1", "a.txt", "https://x/a.txt", 1)
            .await
            .unwrap();
        FileRepository::insert(&db, "u2", "b.txt", "https://x/b.txt", 1)
            .await
            .unwrap();

        let page = FileRepository::list_by_owner(&db, "u1", 1, 20).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.files.len(), 1);
        assert_eq!(page.files[0].filename, "a.txt");
    }

    #[tokio::test]
    async fn listing_orders_most_recent_first_with_id_tiebreak() {
        let db = setup_db().await;
        // Same-timestamp inserts within one test run tie on uploaded_at
        for name in ["first.txt", "second.txt", "third.txt"] {
            FileRepository::insert(&db, "u1", name, "https://x/f", 1)
                .await
                .unwrap();
        }

        let page = FileRepository::list_by_owner(&db, "u1", 1, 20).await.unwrap();
        let names: Vec<&str> = page.files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names, ["third.txt", "second.txt", "first.txt"]);
    }

    #[tokio::test]
    async fn pagination_reports_totals_and_page_count() {
        let db = setup_db().await;
        for i in 0..5 {
            FileRepository::insert(&db, "u1", &format!("f{}.txt", i), "https://x/f", 1)
                .await
                .unwrap();
        }

        let page1 = FileRepository::list_by_owner(&db, "u1", 1, 2).await.unwrap();
        assert_eq!(page1.total, 5);
        assert_eq!(page1.pages, 3);
        assert_eq!(page1.current_page, 1);
        assert_eq!(page1.files.len(), 2);

        let page3 = FileRepository::list_by_owner(&db, "u1", 3, 2).await.unwrap();
        assert_eq!(page3.files.len(), 1);

        let beyond = FileRepository::list_by_owner(&db, "u1", 4, 2).await.unwrap();
        assert!(beyond.files.is_empty());
    }

    #[tokio::test]
    async fn empty_owner_has_zero_pages() {
        let db = setup_db().await;
        let page = FileRepository::list_by_owner(&db, "nobody", 1, 20).await.unwrap();
        assert_eq!(page.total, 0);
        assert_eq!(page.pages, 0);
        assert!(page.files.is_empty());
    }
}

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::FileListResponse;

/// Cache-aside backend for paginated listings. The repository is always the
/// source of truth; entries here are derived and expendable.
#[async_trait]
pub trait PageCache: Send + Sync {
    /// Look up the cached page for an owner. Expired entries count as a miss.
    async fn get(&self, owner_id: &str, page: i64) -> Result<Option<FileListResponse>>;

    /// Store a page with the backend's fixed TTL, overwriting any prior entry.
    async fn set(&self, owner_id: &str, page: i64, payload: FileListResponse) -> Result<()>;

    /// Drop every cached page for an owner
    async fn invalidate(&self, owner_id: &str) -> Result<()>;
}

struct CacheEntry {
    expires_at: Instant,
    payload: FileListResponse,
}

/// In-process TTL cache keyed by `user_files_{owner}_p{page}`
pub struct MemoryCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    fn cache_key(owner_id: &str, page: i64) -> String {
        format!("user_files_{}_p{}", owner_id, page)
    }

    fn owner_prefix(owner_id: &str) -> String {
        format!("user_files_{}_p", owner_id)
    }
}

#[async_trait]
impl PageCache for MemoryCache {
    async fn get(&self, owner_id: &str, page: i64) -> Result<Option<FileListResponse>> {
        let key = Self::cache_key(owner_id, page);

        {
            let entries = self.entries.read().await;
            match entries.get(&key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return Ok(Some(entry.payload.clone()));
                }
                Some(_) => {} // expired, remove below
                None => return Ok(None),
            }
        }

        // Entry exists but is stale
        let mut entries = self.entries.write().await;
        entries.remove(&key);
        Ok(None)
    }

    async fn set(&self, owner_id: &str, page: i64, payload: FileListResponse) -> Result<()> {
        let key = Self::cache_key(owner_id, page);
        let entry = CacheEntry {
            expires_at: Instant::now() + self.ttl,
            payload,
        };

        let mut entries = self.entries.write().await;
        entries.insert(key, entry);
        Ok(())
    }

    async fn invalidate(&self, owner_id: &str) -> Result<()> {
        let prefix = Self::owner_prefix(owner_id);
        let mut entries = self.entries.write().await;
        entries.retain(|key, _| !key.starts_with(&prefix));
        Ok(())
    }
}

//! In-memory storage implementation.
//!
//! Used by tests and by `storage.backend = "memory"` for throwaway runs.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use refresher_core::{Clock, SystemClock, Time};
use tokio::sync::Mutex;
use super::{KvStore, Result};

struct Entry {
    value: String,
    expires_at: Option<Time>,
}

/// Process-local key-value store.
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryKvStore {
    /// Create an empty store on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty store that evaluates TTLs against `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Number of live (unexpired) entries.
    pub async fn len(&self) -> usize {
        let now = self.clock.now();
        self.entries
            .lock()
            .await
            .values()
            .filter(|e| e.expires_at.map_or(true, |at| at > now))
            .count()
    }

    /// True when no live entries remain.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.expires_at.map_or(false, |at| at <= now) => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let expires_at = ttl.map(|ttl| expiry(self.clock.now(), ttl));
        self.entries.lock().await.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }
}

/// Absolute expiry for a TTL starting at `now`.
pub(crate) fn expiry(now: Time, ttl: Duration) -> Time {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(chrono::DateTime::<chrono::Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use refresher_core::FixedClock;

    #[tokio::test]
    async fn test_put_overwrites() {
        let store = MemoryKvStore::new();
        assert!(store.get("k").await.unwrap().is_none());

        store.put("k", "v1", None).await.unwrap();
        store.put("k", "v2", None).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let clock = Arc::new(FixedClock::new(chrono::Utc::now()));
        let store = MemoryKvStore::with_clock(clock.clone());

        store
            .put("news:plumbing", "[]", Some(Duration::from_secs(60)))
            .await
            .unwrap();
        store.put("forever", "x", None).await.unwrap();

        clock.advance(chrono::Duration::seconds(59));
        assert!(store.get("news:plumbing").await.unwrap().is_some());

        clock.advance(chrono::Duration::seconds(1));
        assert!(store.get("news:plumbing").await.unwrap().is_none());
        assert_eq!(store.get("forever").await.unwrap().as_deref(), Some("x"));
        assert_eq!(store.len().await, 1);
    }
}

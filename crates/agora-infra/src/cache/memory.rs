//! Process-local TTL cache.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use agora_core::ports::{Cache, CacheError};

struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// In-memory cache. Expired entries are dropped on access and by the
/// periodic purge job. Contents do not survive a restart.
#[derive(Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if entry.is_live(now) => return Ok(Some(entry.value.clone())),
                Some(_) => {}
            }
        }

        // Re-check under the write lock: the key may have been set again.
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|entry| !entry.is_live(now)) {
            entries.remove(key);
        }
        Ok(entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let expires_at = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| CacheError::Operation(format!("ttl {ttl:?} out of range")))?;

        self.entries.write().await.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let now = Instant::now();
        let removed = self.entries.write().await.remove(key);
        Ok(removed.is_some_and(|entry| entry.is_live(now)))
    }

    async fn purge_expired(&self) -> Result<usize, CacheError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        Ok(before - entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_set_get_delete() {
        let cache = InMemoryCache::new();
        cache.set("verification:code:123456", "payload", MINUTE).await.unwrap();

        assert_eq!(
            cache.get("verification:code:123456").await.unwrap().as_deref(),
            Some("payload")
        );
        assert!(cache.delete("verification:code:123456").await.unwrap());
        assert!(!cache.exists("verification:code:123456").await.unwrap());
        assert!(!cache.delete("verification:code:123456").await.unwrap());
    }

    #[tokio::test]
    async fn test_set_replaces_value_and_ttl() {
        let cache = InMemoryCache::new();
        cache.set("k", "old", Duration::from_millis(1)).await.unwrap();
        cache.set("k", "new", MINUTE).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_expired_entries_are_invisible_and_purged() {
        let cache = InMemoryCache::new();
        cache.set("short", "lived", Duration::from_millis(1)).await.unwrap();
        cache.set("long", "lived", MINUTE).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(!cache.exists("short").await.unwrap());
        cache.set("short2", "lived", Duration::from_millis(1)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(cache.purge_expired().await.unwrap(), 1);
        assert!(cache.exists("long").await.unwrap());
    }
}

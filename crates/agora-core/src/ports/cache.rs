use async_trait::async_trait;
use std::time::Duration;

/// Short-lived key/value storage. Every entry expires.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Read a live entry.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store `value` under `key` for `ttl`, replacing any previous entry.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Remove an entry. Returns whether a live entry was removed.
    async fn delete(&self, key: &str) -> Result<bool, CacheError>;

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.get(key).await?.is_some())
    }

    /// Drop every expired entry. Returns how many were removed. Stores that
    /// evict on their own report zero.
    async fn purge_expired(&self) -> Result<usize, CacheError> {
        Ok(0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    #[error("Cache operation failed: {0}")]
    Operation(String),
}

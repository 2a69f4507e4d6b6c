//! Mock implementation of CacheStore for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::errors::DomainError;

use super::trait_::CacheStore;

/// In-process cache recording the TTL of every write.
///
/// Expiry is simulated explicitly with [`MockCacheStore::expire`].
pub struct MockCacheStore {
    entries: Arc<RwLock<HashMap<String, (String, u64)>>>,
    unavailable: AtomicBool,
    forced_conflicts: AtomicUsize,
    writes: AtomicUsize,
}

impl MockCacheStore {
    /// Create a new empty mock cache
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            unavailable: AtomicBool::new(false),
            forced_conflicts: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    /// Make every call fail as if the store were down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make the next `count` compare-and-set calls report a conflict
    pub fn force_conflicts(&self, count: usize) {
        self.forced_conflicts.store(count, Ordering::SeqCst);
    }

    /// Drop a key as if its TTL had run out
    pub async fn expire(&self, key: &str) {
        self.entries.write().await.remove(key);
    }

    /// TTL used by the last write to `key`
    pub async fn ttl_of(&self, key: &str) -> Option<u64> {
        self.entries.read().await.get(key).map(|(_, ttl)| *ttl)
    }

    /// Raw stored value
    pub async fn raw(&self, key: &str) -> Option<String> {
        self.entries.read().await.get(key).map(|(value, _)| value.clone())
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::store_unavailable("mock cache is down"));
        }
        Ok(())
    }
}

impl Default for MockCacheStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MockCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        self.check_available()?;
        Ok(self.raw(key).await)
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: u64,
    ) -> Result<(), DomainError> {
        self.check_available()?;
        self.entries
            .write()
            .await
            .insert(key.to_string(), (value.to_string(), ttl_seconds));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
        ttl_seconds: u64,
    ) -> Result<bool, DomainError> {
        self.check_available()?;

        let forced = self
            .forced_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if forced {
            return Ok(false);
        }

        let mut entries = self.entries.write().await;
        let current = entries.get(key).map(|(value, _)| value.as_str());
        if current != expected {
            return Ok(false);
        }
        entries.insert(key.to_string(), (value.to_string(), ttl_seconds));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(true)
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        self.check_available()?;
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn health_check(&self) -> Result<(), DomainError> {
        self.check_available()
    }
}

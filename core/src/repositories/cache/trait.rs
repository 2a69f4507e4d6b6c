//! TTL key-value store interface backing the token buckets.

use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::DomainError;

/// External key-value store with per-key expiry.
///
/// Values are opaque strings. An expired key is indistinguishable from one that was
/// never written. Implementations surface connectivity failures as
/// `DomainError::StoreUnavailable` so callers never mistake an outage for an empty key.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read a value
    ///
    /// # Returns
    /// * `Ok(Some(value))` - Key present and not expired
    /// * `Ok(None)` - Key absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Write a value, replacing any previous one, expiring after `ttl_seconds`
    async fn set_with_expiry(&self, key: &str, value: &str, ttl_seconds: u64)
        -> Result<(), DomainError>;

    /// Atomically write `value` only if the current value equals `expected`
    ///
    /// # Arguments
    /// * `expected` - `None` requires the key to be absent, `Some(v)` requires it to hold `v`
    /// * `ttl_seconds` - Expiry applied on a successful write
    ///
    /// # Returns
    /// * `Ok(true)` - The write happened
    /// * `Ok(false)` - The current value differed; nothing was written
    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
        ttl_seconds: u64,
    ) -> Result<bool, DomainError>;

    /// Delete a key, returning whether it existed
    async fn delete(&self, key: &str) -> Result<bool, DomainError>;

    /// Check that the store is reachable
    async fn health_check(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

#[async_trait]
impl<T: CacheStore + ?Sized> CacheStore for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        (**self).get(key).await
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: u64,
    ) -> Result<(), DomainError> {
        (**self).set_with_expiry(key, value, ttl_seconds).await
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
        ttl_seconds: u64,
    ) -> Result<bool, DomainError> {
        (**self).compare_and_set(key, expected, value, ttl_seconds).await
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        (**self).delete(key).await
    }

    async fn health_check(&self) -> Result<(), DomainError> {
        (**self).health_check().await
    }
}

//! Token store backed by a TTL key-value cache.
//!
//! Each bucket lives under `user:{id}:tokens:{kind}` as a JSON array of token strings.
//! Mutations are read-modify-write cycles committed with `compare_and_set`, so two
//! concurrent writers to the same bucket never silently drop each other's tokens and
//! a token can be removed by at most one caller.

use async_trait::async_trait;
use constant_time_eq::constant_time_eq;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::domain::entities::token::TokenKind;
use crate::errors::DomainError;
use crate::repositories::cache::CacheStore;

use super::trait_::TokenStore;

/// Compare-and-set attempts per mutation before giving up
pub const DEFAULT_MAX_WRITE_ATTEMPTS: usize = 8;

/// Cache key of a bucket
pub fn bucket_key(user_id: i64, kind: TokenKind) -> String {
    format!("user:{}:tokens:{}", user_id, kind.as_str())
}

/// [`TokenStore`] implementation over any [`CacheStore`]
pub struct BucketTokenStore<C: CacheStore> {
    cache: Arc<C>,
    max_tokens: usize,
    max_attempts: usize,
}

impl<C: CacheStore> BucketTokenStore<C> {
    /// Creates a store keeping at most `max_tokens` tokens per bucket (at least one)
    pub fn new(cache: Arc<C>, max_tokens: usize) -> Self {
        Self {
            cache,
            max_tokens: max_tokens.max(1),
            max_attempts: DEFAULT_MAX_WRITE_ATTEMPTS,
        }
    }

    /// Override how many times a conflicting write is retried
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Bucket capacity
    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Underlying cache
    pub fn cache(&self) -> &Arc<C> {
        &self.cache
    }

    /// Read the raw value and its parsed contents
    async fn load(&self, key: &str) -> Result<(Option<String>, Vec<String>), DomainError> {
        let raw = self.cache.get(key).await?;
        let tokens = match raw.as_deref() {
            Some(value) => parse_bucket(key, value),
            None => Vec::new(),
        };
        Ok((raw, tokens))
    }

    /// Apply `change` to the bucket and commit it, retrying when another writer got there first
    async fn mutate<F, R>(&self, key: &str, ttl: Duration, change: F) -> Result<R, DomainError>
    where
        F: Fn(&mut Vec<String>) -> R + Send + Sync,
        R: Send,
    {
        let ttl_seconds = ttl_seconds(ttl);

        for attempt in 1..=self.max_attempts {
            let (raw, mut tokens) = self.load(key).await?;
            let outcome = change(&mut tokens);
            let value = serde_json::to_string(&tokens)?;

            if self
                .cache
                .compare_and_set(key, raw.as_deref(), &value, ttl_seconds)
                .await?
            {
                debug!(key, attempt, size = tokens.len(), ttl_seconds, "Bucket written");
                return Ok(outcome);
            }

            debug!(key, attempt, "Bucket changed concurrently, retrying");
        }

        warn!(key, attempts = self.max_attempts, "Giving up on contended bucket");
        Err(DomainError::store_unavailable(format!(
            "bucket {} is under too much contention",
            key
        )))
    }
}

#[async_trait]
impl<C: CacheStore> TokenStore for BucketTokenStore<C> {
    async fn list(&self, user_id: i64, kind: TokenKind) -> Result<Vec<String>, DomainError> {
        let (_, tokens) = self.load(&bucket_key(user_id, kind)).await?;
        Ok(tokens)
    }

    async fn insert(
        &self,
        user_id: i64,
        kind: TokenKind,
        token: &str,
        lifetime: Duration,
    ) -> Result<(), DomainError> {
        let max_tokens = self.max_tokens;
        self.mutate(&bucket_key(user_id, kind), lifetime, |tokens| {
            // FIFO: oldest first
            while tokens.len() >= max_tokens {
                tokens.remove(0);
            }
            tokens.push(token.to_string());
        })
        .await
    }

    async fn remove(
        &self,
        user_id: i64,
        kind: TokenKind,
        token: &str,
        extended_ttl: Duration,
    ) -> Result<bool, DomainError> {
        self.mutate(&bucket_key(user_id, kind), extended_ttl, |tokens| {
            let before = tokens.len();
            tokens.retain(|live| live != token);
            tokens.len() != before
        })
        .await
    }

    async fn contains(
        &self,
        user_id: i64,
        kind: TokenKind,
        token: &str,
    ) -> Result<bool, DomainError> {
        let tokens = self.list(user_id, kind).await?;
        Ok(tokens
            .iter()
            .any(|live| constant_time_eq(live.as_bytes(), token.as_bytes())))
    }

    async fn clear(&self, user_id: i64, kind: TokenKind) -> Result<(), DomainError> {
        let key = bucket_key(user_id, kind);
        let existed = self.cache.delete(&key).await?;
        debug!(key = %key, existed, "Bucket cleared");
        Ok(())
    }
}

/// A bucket that cannot be parsed is treated as empty; none of its tokens are trusted.
fn parse_bucket(key: &str, value: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(value) {
        Ok(tokens) => tokens,
        Err(err) => {
            warn!(key, error = %err, "Discarding unreadable token bucket");
            Vec::new()
        }
    }
}

/// Stores reject a zero expiry, so round up to one second
fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

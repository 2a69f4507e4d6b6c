//! Redis cache client implementation
//!
//! Provides a Redis-backed [`CacheStore`] with a multiplexed connection, retry logic
//! with exponential backoff, and an atomic compare-and-set implemented as a Lua script.

use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client, RedisError, RedisResult, Script};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use tk_core::errors::DomainError;
use tk_core::repositories::CacheStore;
use tk_shared::CacheConfig;

use crate::InfrastructureError;

/// Writes `ARGV[3]` with expiry `ARGV[4]` only if the key currently holds `ARGV[2]`
/// (`ARGV[1] == "1"`) or is absent (`ARGV[1] == "0"`).
const COMPARE_AND_SET_SCRIPT: &str = r"
local current = redis.call('GET', KEYS[1])
if ARGV[1] == '1' then
    if current ~= ARGV[2] then
        return 0
    end
elseif current then
    return 0
end
redis.call('SET', KEYS[1], ARGV[3], 'EX', ARGV[4])
return 1
";

/// Upper bound for the retry backoff
const MAX_RETRY_DELAY_MS: u64 = 5_000;

type RedisFuture<T> = Pin<Box<dyn Future<Output = RedisResult<T>> + Send>>;

/// Whether a failed command may be sent again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Replay {
    /// Reads, plain writes and deletes: resending yields the same state
    Safe,
    /// The reply may be lost after the server applied the command
    Unsafe,
}

/// Redis cache client with connection reuse and retry logic
#[derive(Clone)]
pub struct RedisCache {
    /// Redis multiplexed connection for async operations
    connection: MultiplexedConnection,
    /// Configuration used to create this client
    config: CacheConfig,
    cas_script: Script,
}

impl RedisCache {
    /// Connect to Redis
    ///
    /// # Arguments
    /// * `config` - Cache configuration (URL, key prefix, retry policy)
    ///
    /// # Returns
    /// * `Result<Self, InfrastructureError>` - Redis client or error
    ///
    /// # Example
    /// ```no_run
    /// use tk_infra::cache::RedisCache;
    /// use tk_shared::CacheConfig;
    ///
    /// async fn create_client() -> Result<RedisCache, Box<dyn std::error::Error>> {
    ///     let config = CacheConfig::redis("redis://localhost:6379").with_prefix("tk");
    ///     let client = RedisCache::new(config).await?;
    ///     Ok(client)
    /// }
    /// ```
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        info!("Creating Redis client with URL: {}", mask_url(&config.url));

        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection =
            Self::create_connection_with_retry(client, config.max_retries, config.retry_delay_ms)
                .await?;

        info!("Redis client created successfully");

        Ok(Self {
            connection,
            config,
            cas_script: Script::new(COMPARE_AND_SET_SCRIPT),
        })
    }

    /// Create multiplexed connection with retry logic
    async fn create_connection_with_retry(
        client: Client,
        max_retries: u32,
        retry_delay_ms: u64,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let mut attempts = 0;
        let mut delay = retry_delay_ms;

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            match client.get_multiplexed_async_connection().await {
                Ok(connection) => {
                    info!("Successfully connected to Redis");
                    return Ok(connection);
                }
                Err(e) if attempts < max_retries => {
                    warn!(
                        "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(MAX_RETRY_DELAY_MS);
                }
                Err(e) => {
                    error!("Failed to connect to Redis after {} attempts: {}", attempts, e);
                    return Err(InfrastructureError::Cache(e));
                }
            }
        }
    }

    fn key(&self, key: &str) -> String {
        self.config.make_key(key)
    }

    /// Set a value with expiration time
    pub async fn set_ex(
        &self,
        key: &str,
        value: &str,
        expiry_seconds: u64,
    ) -> Result<(), InfrastructureError> {
        let key = self.key(key);
        debug!("Setting key '{}' with expiry {}s", key, expiry_seconds);

        self.execute_with_retry(Replay::Safe, |mut conn| {
            let key = key.clone();
            let value = value.to_string();
            Box::pin(async move { conn.set_ex::<_, _, ()>(key, value, expiry_seconds).await })
        })
        .await
        .map_err(|e| {
            error!("Failed to set key '{}': {}", key, e);
            InfrastructureError::Cache(e)
        })
    }

    /// Get a value
    pub async fn get_value(&self, key: &str) -> Result<Option<String>, InfrastructureError> {
        let key = self.key(key);
        debug!("Getting key '{}'", key);

        self.execute_with_retry(Replay::Safe, |mut conn| {
            let key = key.clone();
            Box::pin(async move { conn.get::<_, Option<String>>(key).await })
        })
        .await
        .map_err(|e| {
            error!("Failed to get key '{}': {}", key, e);
            InfrastructureError::Cache(e)
        })
    }

    /// Atomic compare-and-set, see [`CacheStore::compare_and_set`]
    pub async fn compare_and_set_value(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
        expiry_seconds: u64,
    ) -> Result<bool, InfrastructureError> {
        let key = self.key(key);
        let (flag, expected) = match expected {
            Some(expected) => ("1", expected.to_string()),
            None => ("0", String::new()),
        };

        // Sent once: a lost reply may follow an applied write.
        let written = self
            .execute_with_retry(Replay::Unsafe, |mut conn| {
                let script = self.cas_script.clone();
                let key = key.clone();
                let expected = expected.clone();
                let value = value.to_string();
                Box::pin(async move {
                    script
                        .key(key)
                        .arg(flag)
                        .arg(expected)
                        .arg(value)
                        .arg(expiry_seconds)
                        .invoke_async::<_, i64>(&mut conn)
                        .await
                })
            })
            .await
            .map_err(|e| {
                error!("Compare-and-set on '{}' failed: {}", key, e);
                InfrastructureError::Cache(e)
            })?;

        debug!("Compare-and-set on '{}' written: {}", key, written == 1);
        Ok(written == 1)
    }

    /// Delete a key, returning whether it existed
    pub async fn delete_key(&self, key: &str) -> Result<bool, InfrastructureError> {
        let key = self.key(key);
        debug!("Deleting key '{}'", key);

        let deleted = self
            .execute_with_retry(Replay::Safe, |mut conn| {
                let key = key.clone();
                Box::pin(async move { conn.del::<_, u32>(key).await })
            })
            .await
            .map_err(|e| {
                error!("Failed to delete key '{}': {}", key, e);
                InfrastructureError::Cache(e)
            })?;

        Ok(deleted > 0)
    }

    /// Remaining TTL of a key in seconds, `None` if absent or persistent
    pub async fn ttl(&self, key: &str) -> Result<Option<i64>, InfrastructureError> {
        let key = self.key(key);

        let ttl = self
            .execute_with_retry(Replay::Safe, |mut conn| {
                let key = key.clone();
                Box::pin(async move { conn.ttl::<_, i64>(key).await })
            })
            .await
            .map_err(InfrastructureError::Cache)?;

        Ok((ttl >= 0).then_some(ttl))
    }

    /// PING the server
    pub async fn ping(&self) -> Result<bool, InfrastructureError> {
        debug!("Performing Redis health check");

        let response = self
            .execute_with_retry(Replay::Safe, |mut conn| {
                Box::pin(async move { redis::cmd("PING").query_async::<_, String>(&mut conn).await })
            })
            .await
            .map_err(|e| {
                error!("Redis health check failed: {}", e);
                InfrastructureError::Cache(e)
            })?;

        if response != "PONG" {
            warn!("Redis health check returned unexpected response: {}", response);
        }
        Ok(response == "PONG")
    }

    async fn execute_with_retry<F, T>(&self, replay: Replay, operation: F) -> RedisResult<T>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        let mut attempts = 0;
        let mut delay = self.config.retry_delay_ms;

        loop {
            attempts += 1;
            let conn = self.connection.clone();

            match operation(conn).await {
                Ok(result) => return Ok(result),
                Err(e) if attempts < self.config.max_retries && should_retry(&e, replay) => {
                    warn!(
                        "Redis operation failed (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, self.config.max_retries, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(MAX_RETRY_DELAY_MS);
                }
                Err(e) => {
                    error!("Redis operation failed after {} attempts: {}", attempts, e);
                    return Err(e);
                }
            }
        }
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.get_value(key).await?)
    }

    async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: u64,
    ) -> Result<(), DomainError> {
        Ok(self.set_ex(key, value, ttl_seconds).await?)
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&str>,
        value: &str,
        ttl_seconds: u64,
    ) -> Result<bool, DomainError> {
        Ok(self
            .compare_and_set_value(key, expected, value, ttl_seconds)
            .await?)
    }

    async fn delete(&self, key: &str) -> Result<bool, DomainError> {
        Ok(self.delete_key(key).await?)
    }

    async fn health_check(&self) -> Result<(), DomainError> {
        if self.ping().await? {
            Ok(())
        } else {
            Err(DomainError::store_unavailable("unexpected PING response"))
        }
    }
}

/// Transient errors worth retrying
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError
            | redis::ErrorKind::ClientError
            | redis::ErrorKind::BusyLoadingError
            | redis::ErrorKind::TryAgain
    )
}

pub(crate) fn should_retry(error: &RedisError, replay: Replay) -> bool {
    replay == Replay::Safe && is_retriable_error(error)
}

/// Mask credentials in a Redis URL for logging
pub(crate) fn mask_url(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@') {
        if let Some(proto_end) = url.find("://") {
            let proto = &url[..proto_end + 3];
            let host_part = &url[at_pos..];
            return format!("{}****{}", proto, host_part);
        }
    }
    url.to_string()
}

//! TTL key-value stores backing the token buckets
//!
//! - `redis_cache` - Redis client with retry logic, for multi-instance deployments
//! - `memory_cache` - process-local store for development and tests

pub mod memory_cache;
pub mod redis_cache;

pub use memory_cache::MemoryCache;
pub use redis_cache::RedisCache;

#[cfg(test)]
mod tests;

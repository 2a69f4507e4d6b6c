//! # Infrastructure Layer
//!
//! Concrete adapters for the TokenKeeper core:
//! - **Cache**: Redis and in-memory implementations of the TTL key-value store that
//!   holds the token buckets
//! - **Database**: MySQL user repository using SQLx
//! - **Repositories**: in-memory user repository for development and tests
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)
//! - `redis-cache`: Enable Redis caching support (default)

use tk_core::errors::DomainError;

/// Cache module - Redis and in-memory TTL stores
pub mod cache;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Repositories module - In-process implementations
pub mod repositories;

pub use cache::{MemoryCache, RedisCache};
pub use repositories::InMemoryUserRepository;

#[cfg(feature = "mysql")]
pub use database::{DatabasePool, MySqlUserRepository};

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Stored data could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::Cache(e) => DomainError::StoreUnavailable {
                message: format!("cache: {}", e),
            },
            InfrastructureError::Database(e) => DomainError::StoreUnavailable {
                message: format!("database: {}", e),
            },
            InfrastructureError::Serialization(e) => DomainError::Internal {
                message: format!("serialization: {}", e),
            },
            InfrastructureError::Config(message) => DomainError::Internal { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_errors_map_to_store_unavailable() {
        let err = redis::RedisError::from((redis::ErrorKind::IoError, "connection refused"));
        let domain: DomainError = InfrastructureError::Cache(err).into();
        assert!(matches!(domain, DomainError::StoreUnavailable { .. }));
    }

    #[test]
    fn test_config_errors_map_to_internal() {
        let domain: DomainError = InfrastructureError::Config("bad url".to_string()).into();
        assert!(matches!(domain, DomainError::Internal { message } if message == "bad url"));
    }
}

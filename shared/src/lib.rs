//! Shared utilities and common types for the TokenKeeper server
//!
//! This crate provides common functionality used across all server modules:
//! - Configuration types loaded from the environment
//! - Error response structures
//! - Validation and masking helpers
//! - Response envelopes

pub mod config;
pub mod errors;
pub mod types;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, CacheBackend, CacheConfig, DatabaseConfig, Environment,
    LogFormat, LoggingConfig, ServerConfig, SessionConfig,
};
pub use errors::{error_codes, ErrorResponse};
pub use types::{
    ClientInfo, DatabaseInfo, HealthResponse, HealthStatus, MessageResponse, ServerInfo,
    ServiceHealth,
};
pub use utils::validation;

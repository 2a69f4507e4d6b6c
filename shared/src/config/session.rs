//! Session token configuration

use serde::{Deserialize, Serialize};

use super::env_or;

/// Default access token lifetime in minutes
pub const DEFAULT_ACCESS_TOKEN_TTL_MINUTES: i64 = 60;

/// Default refresh token lifetime in minutes (30 days)
pub const DEFAULT_REFRESH_TOKEN_TTL_MINUTES: i64 = 43_200;

/// Default number of live tokens kept per user and kind
pub const DEFAULT_MAX_TOKENS_PER_USER: usize = 5;

/// Default bucket lifetime applied after a token is removed
pub const DEFAULT_REMOVAL_TTL_DAYS: i64 = 30;

/// Default nonce length embedded in every token
pub const DEFAULT_NONCE_LENGTH: usize = 32;

/// Shortest accepted token lifetime in minutes
pub const MIN_TOKEN_TTL_MINUTES: i64 = 1;

/// Longest accepted token lifetime in minutes (ten years)
pub const MAX_TOKEN_TTL_MINUTES: i64 = 5_256_000;

/// Longest accepted removal TTL in days
pub const MAX_REMOVAL_TTL_DAYS: i64 = 3_650;

/// Token lifetimes and bucket limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Access token lifetime in minutes
    pub access_token_ttl_minutes: i64,

    /// Refresh token lifetime in minutes
    pub refresh_token_ttl_minutes: i64,

    /// Maximum live tokens per user per kind
    pub max_tokens_per_user: usize,

    /// Bucket lifetime written back after a removal, in days.
    /// Independent of the token kind.
    pub removal_ttl_days: i64,

    /// Length of the random nonce in characters
    #[serde(default = "default_nonce_length")]
    pub nonce_length: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            access_token_ttl_minutes: DEFAULT_ACCESS_TOKEN_TTL_MINUTES,
            refresh_token_ttl_minutes: DEFAULT_REFRESH_TOKEN_TTL_MINUTES,
            max_tokens_per_user: DEFAULT_MAX_TOKENS_PER_USER,
            removal_ttl_days: DEFAULT_REMOVAL_TTL_DAYS,
            nonce_length: default_nonce_length(),
        }
    }
}

impl SessionConfig {
    /// Create from environment variables
    ///
    /// Reads `ACCESS_TOKEN_TTL`, `REFRESH_TOKEN_TTL` (both minutes),
    /// `MAX_TOKENS_PER_USER` and `TOKEN_REMOVAL_TTL_DAYS`.
    pub fn from_env() -> Self {
        Self {
            access_token_ttl_minutes: env_or("ACCESS_TOKEN_TTL", DEFAULT_ACCESS_TOKEN_TTL_MINUTES),
            refresh_token_ttl_minutes: env_or(
                "REFRESH_TOKEN_TTL",
                DEFAULT_REFRESH_TOKEN_TTL_MINUTES,
            ),
            max_tokens_per_user: env_or("MAX_TOKENS_PER_USER", DEFAULT_MAX_TOKENS_PER_USER),
            removal_ttl_days: env_or("TOKEN_REMOVAL_TTL_DAYS", DEFAULT_REMOVAL_TTL_DAYS),
            nonce_length: default_nonce_length(),
        }
        .normalized()
    }

    /// Set access token lifetime in minutes
    pub fn with_access_ttl_minutes(mut self, minutes: i64) -> Self {
        self.access_token_ttl_minutes = minutes;
        self.normalized()
    }

    /// Set refresh token lifetime in minutes
    pub fn with_refresh_ttl_minutes(mut self, minutes: i64) -> Self {
        self.refresh_token_ttl_minutes = minutes;
        self.normalized()
    }

    /// Set the per-user bucket capacity
    pub fn with_max_tokens(mut self, max: usize) -> Self {
        self.max_tokens_per_user = max;
        self.normalized()
    }

    /// A bucket must be able to hold at least the token just issued, and a token
    /// must outlive the request that issued it.
    fn normalized(mut self) -> Self {
        self.access_token_ttl_minutes = self
            .access_token_ttl_minutes
            .clamp(MIN_TOKEN_TTL_MINUTES, MAX_TOKEN_TTL_MINUTES);
        self.refresh_token_ttl_minutes = self
            .refresh_token_ttl_minutes
            .clamp(MIN_TOKEN_TTL_MINUTES, MAX_TOKEN_TTL_MINUTES);
        self.removal_ttl_days = self.removal_ttl_days.clamp(0, MAX_REMOVAL_TTL_DAYS);
        self.max_tokens_per_user = self.max_tokens_per_user.max(1);
        self.nonce_length = self.nonce_length.max(DEFAULT_NONCE_LENGTH);
        self
    }

    /// Bucket TTL after a removal, in seconds
    pub fn removal_ttl_seconds(&self) -> u64 {
        (self.removal_ttl_days.clamp(0, MAX_REMOVAL_TTL_DAYS) as u64) * 86_400
    }
}

fn default_nonce_length() -> usize {
    DEFAULT_NONCE_LENGTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_default() {
        let config = SessionConfig::default();
        assert_eq!(config.access_token_ttl_minutes, 60);
        assert_eq!(config.refresh_token_ttl_minutes, 43_200);
        assert_eq!(config.max_tokens_per_user, 5);
        assert_eq!(config.removal_ttl_seconds(), 30 * 86_400);
        assert_eq!(config.nonce_length, 32);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let config = SessionConfig::default().with_max_tokens(0);
        assert_eq!(config.max_tokens_per_user, 1);
    }

    #[test]
    fn test_builder() {
        let config = SessionConfig::default()
            .with_access_ttl_minutes(15)
            .with_refresh_ttl_minutes(120)
            .with_max_tokens(3);

        assert_eq!(config.access_token_ttl_minutes, 15);
        assert_eq!(config.refresh_token_ttl_minutes, 120);
        assert_eq!(config.max_tokens_per_user, 3);
    }

    #[test]
    fn test_non_positive_lifetimes_are_raised_to_minimum() {
        let config = SessionConfig::default()
            .with_access_ttl_minutes(-5)
            .with_refresh_ttl_minutes(0);

        assert_eq!(config.access_token_ttl_minutes, MIN_TOKEN_TTL_MINUTES);
        assert_eq!(config.refresh_token_ttl_minutes, MIN_TOKEN_TTL_MINUTES);
    }

    #[test]
    fn test_huge_lifetimes_are_capped() {
        let config = SessionConfig::default()
            .with_access_ttl_minutes(1_000_000_000_000)
            .with_refresh_ttl_minutes(i64::MAX);

        assert_eq!(config.access_token_ttl_minutes, MAX_TOKEN_TTL_MINUTES);
        assert_eq!(config.refresh_token_ttl_minutes, MAX_TOKEN_TTL_MINUTES);
    }

    #[test]
    fn test_removal_ttl_is_bounded() {
        let mut config = SessionConfig::default();
        config.removal_ttl_days = i64::MAX;
        assert_eq!(config.removal_ttl_seconds(), MAX_REMOVAL_TTL_DAYS as u64 * 86_400);

        config.removal_ttl_days = -1;
        assert_eq!(config.removal_ttl_seconds(), 0);
    }
}

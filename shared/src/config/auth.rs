//! Credential policy configuration

use serde::{Deserialize, Serialize};

use super::env_or;

/// Password hashing and credential rules
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// bcrypt work factor used when hashing passwords
    pub bcrypt_cost: u32,

    /// Minimum accepted password length
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: 12,
            min_password_length: default_min_password_length(),
        }
    }
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        Self {
            bcrypt_cost: env_or("BCRYPT_COST", 12u32).clamp(4, 31),
            ..Default::default()
        }
    }

    /// Set the bcrypt cost (tests use the minimum to stay fast)
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost.clamp(4, 31);
        self
    }
}

fn default_min_password_length() -> usize {
    8
}

//! bcrypt password hashing
//!
//! Hashing is CPU-bound, so both operations run on the blocking thread pool.

use tracing::warn;

use crate::errors::DomainError;

/// bcrypt hasher with a fixed cost
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a plaintext password
    pub async fn hash(&self, password: &str) -> Result<String, DomainError> {
        let password = password.to_string();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| DomainError::internal(format!("hashing task failed: {}", e)))?
            .map_err(|e| DomainError::internal(format!("password hashing failed: {}", e)))
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// An unreadable stored hash counts as a mismatch.
    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, DomainError> {
        let password = password.to_string();
        let hash = hash.to_string();

        let result = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| DomainError::internal(format!("verification task failed: {}", e)))?;

        match result {
            Ok(matches) => Ok(matches),
            Err(err) => {
                warn!(error = %err, "Stored password hash could not be read");
                Ok(false)
            }
        }
    }
}

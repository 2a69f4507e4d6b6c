//! Token store trait defining the per-user, per-kind token buckets.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::entities::token::TokenKind;
use crate::errors::DomainError;

/// Bounded, insertion-ordered collections of live token strings keyed by `(user_id, kind)`.
///
/// Every bucket carries one TTL shared by all its tokens. Once a bucket expires every
/// token in it stops being live, whatever the expiry embedded in the token itself.
/// A missing bucket behaves exactly like an empty one.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Live tokens of one kind for a user, oldest first
    ///
    /// # Returns
    /// * `Ok(Vec)` - Possibly empty when the bucket is absent or expired
    /// * `Err(DomainError::StoreUnavailable)` - The backing store failed
    async fn list(&self, user_id: i64, kind: TokenKind) -> Result<Vec<String>, DomainError>;

    /// Append a token, evicting the oldest ones if the bucket is full
    ///
    /// # Arguments
    /// * `lifetime` - New TTL of the whole bucket, measured from now
    async fn insert(
        &self,
        user_id: i64,
        kind: TokenKind,
        token: &str,
        lifetime: Duration,
    ) -> Result<(), DomainError>;

    /// Remove a token and write the remaining ones back with `extended_ttl`
    ///
    /// # Returns
    /// * `Ok(true)` - The token was live and this call removed it
    /// * `Ok(false)` - The token was not in the bucket (the bucket is still rewritten)
    async fn remove(
        &self,
        user_id: i64,
        kind: TokenKind,
        token: &str,
        extended_ttl: Duration,
    ) -> Result<bool, DomainError>;

    /// Membership check against the live bucket
    async fn contains(&self, user_id: i64, kind: TokenKind, token: &str)
        -> Result<bool, DomainError>;

    /// Delete the bucket, invalidating every token of that kind for the user
    async fn clear(&self, user_id: i64, kind: TokenKind) -> Result<(), DomainError>;
}

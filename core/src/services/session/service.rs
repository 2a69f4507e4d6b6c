//! Session manager implementation

use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, info, warn};

use tk_shared::utils::mask_token;
use tk_shared::SessionConfig;

use crate::clock::{Clock, SystemClock};
use crate::domain::entities::token::{ActiveTokens, TokenKind, TokenPair, TokenPayload};
use crate::domain::entities::user::User;
use crate::errors::{AuthError, DomainError, TokenError};
use crate::repositories::{TokenStore, UserRepository};
use crate::services::token::{generate_nonce, TokenCodec};

/// Issues, validates, rotates and revokes session tokens.
///
/// Holds no mutable state of its own; every bucket lives in the [`TokenStore`].
pub struct SessionManager<S: TokenStore, U: UserRepository> {
    store: Arc<S>,
    users: Arc<U>,
    config: SessionConfig,
    clock: Arc<dyn Clock>,
}

impl<S: TokenStore, U: UserRepository> SessionManager<S, U> {
    /// Creates a new session manager using the system clock
    ///
    /// # Arguments
    ///
    /// * `store` - Token buckets
    /// * `users` - Identity collaborator used to confirm token owners still exist
    /// * `config` - Lifetimes and removal TTL
    pub fn new(store: Arc<S>, users: Arc<U>, config: SessionConfig) -> Self {
        Self {
            store,
            users,
            config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Session configuration in use
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Lifetime of a token kind, which is also its bucket TTL
    ///
    /// Fails with `DomainError::Internal` when the configured minutes do not fit a duration.
    pub fn lifetime(&self, kind: TokenKind) -> Result<Duration, DomainError> {
        let minutes = match kind {
            TokenKind::Access => self.config.access_token_ttl_minutes,
            TokenKind::Refresh => self.config.refresh_token_ttl_minutes,
        };

        Duration::try_minutes(minutes)
            .ok_or_else(|| DomainError::internal(format!("{} token lifetime out of range", kind)))
    }

    fn removal_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.config.removal_ttl_seconds())
    }

    /// Mints a token of `kind` for `user` and stores it, evicting the oldest if the bucket is full
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The opaque token
    /// * `Err(DomainError::StoreUnavailable)` - The bucket could not be written
    /// * `Err(DomainError::Internal)` - The configured lifetime gives no usable expiry
    pub async fn issue(&self, user: &User, kind: TokenKind) -> Result<String, DomainError> {
        let lifetime = self.lifetime(kind)?;
        if lifetime <= Duration::zero() {
            return Err(DomainError::internal(format!(
                "{} token lifetime must be positive",
                kind
            )));
        }
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(lifetime)
            .ok_or_else(|| DomainError::internal(format!("{} token expiry overflows", kind)))?;
        let payload = TokenPayload::new(
            user.id,
            kind,
            expires_at,
            generate_nonce(self.config.nonce_length),
        );
        let token = TokenCodec::encode(&payload);

        let bucket_ttl = lifetime.to_std().unwrap_or_default();
        self.store.insert(user.id, kind, &token, bucket_ttl).await?;

        debug!(
            user_id = user.id,
            kind = %kind,
            token = %mask_token(&token),
            exp = payload.exp,
            "Token issued"
        );
        Ok(token)
    }

    /// Issues an access token and a refresh token.
    ///
    /// Not atomic: if the refresh token cannot be stored the access token stays live.
    pub async fn issue_pair(&self, user: &User) -> Result<TokenPair, DomainError> {
        let access_token = self.issue(user, TokenKind::Access).await?;
        let refresh_token = self.issue(user, TokenKind::Refresh).await?;

        info!(user_id = user.id, "Token pair issued");
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Validates a presented token and returns its owner
    ///
    /// # Returns
    ///
    /// * `Ok(User)` - Token is well-formed, of `expected_kind`, unexpired, owned by an
    ///   existing user and still live in that user's bucket
    /// * `Err(TokenError::*)` - One of the token checks failed
    /// * `Err(AuthError::UserNotFound)` - The owner no longer exists
    pub async fn validate(&self, token: &str, expected_kind: TokenKind) -> Result<User, DomainError> {
        let payload = TokenCodec::decode(token).map_err(|e| self.reject(token, e))?;

        if payload.kind != expected_kind {
            return Err(self.reject(token, TokenError::WrongKind).into());
        }

        if payload.is_expired_at(self.clock.timestamp()) {
            return Err(self.reject(token, TokenError::ExpiredToken).into());
        }

        let user = match self.users.find_by_id(payload.uid).await? {
            Some(user) => user,
            None => {
                warn!(user_id = payload.uid, token = %mask_token(token), "Token owner no longer exists");
                return Err(AuthError::UserNotFound.into());
            }
        };

        if !self.store.contains(payload.uid, payload.kind, token).await? {
            return Err(self.reject(token, TokenError::EvictedOrRevoked).into());
        }

        Ok(user)
    }

    fn reject(&self, token: &str, reason: TokenError) -> TokenError {
        warn!(token = %mask_token(token), reason = %reason, "Token rejected");
        reason
    }

    /// Exchanges a refresh token for a fresh pair, consuming it.
    ///
    /// The used token is removed with a conditional write, so of two concurrent rotations
    /// with the same token exactly one succeeds.
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - New access and refresh tokens
    /// * `Err(TokenError::ReplayedRefresh)` - Token already used, evicted or revoked
    /// * `Err(AuthError::UserNotFound)` - Owner no longer exists
    /// * `Err(TokenError::*)` - Malformed, expired or not a refresh token
    pub async fn rotate_refresh(&self, refresh_token: &str) -> Result<TokenPair, DomainError> {
        let user = self
            .validate(refresh_token, TokenKind::Refresh)
            .await
            .map_err(|e| match e {
                DomainError::Token(TokenError::EvictedOrRevoked) => {
                    DomainError::Token(TokenError::ReplayedRefresh)
                }
                other => other,
            })?;

        let removed = self
            .store
            .remove(user.id, TokenKind::Refresh, refresh_token, self.removal_ttl())
            .await?;
        if !removed {
            warn!(
                user_id = user.id,
                token = %mask_token(refresh_token),
                "Refresh token consumed by a concurrent rotation"
            );
            return Err(TokenError::ReplayedRefresh.into());
        }

        let pair = self.issue_pair(&user).await?;
        info!(user_id = user.id, "Refresh token rotated");
        Ok(pair)
    }

    /// Removes one token from the user's bucket of `kind`
    ///
    /// # Returns
    ///
    /// `true` if the token was live
    pub async fn revoke(&self, user_id: i64, token: &str, kind: TokenKind) -> Result<bool, DomainError> {
        let removed = self
            .store
            .remove(user_id, kind, token, self.removal_ttl())
            .await?;

        debug!(user_id, kind = %kind, token = %mask_token(token), removed, "Token revoked");
        Ok(removed)
    }

    /// Clears both buckets of a user, ending every session
    pub async fn revoke_all(&self, user_id: i64) -> Result<(), DomainError> {
        for kind in TokenKind::ALL {
            self.store.clear(user_id, kind).await?;
        }

        info!(user_id, "All tokens revoked");
        Ok(())
    }

    /// Live tokens of a user, oldest first within each kind
    pub async fn list_active(&self, user_id: i64) -> Result<ActiveTokens, DomainError> {
        Ok(ActiveTokens {
            access_tokens: self.store.list(user_id, TokenKind::Access).await?,
            refresh_tokens: self.store.list(user_id, TokenKind::Refresh).await?,
        })
    }
}

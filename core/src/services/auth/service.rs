//! Authentication service implementation

use std::sync::Arc;
use tracing::{info, warn};

use tk_shared::utils::is_valid_email;
use tk_shared::AuthConfig;

use crate::domain::entities::token::{ActiveTokens, TokenKind, TokenPair};
use crate::domain::entities::user::{NewUser, User};
use crate::errors::{AuthError, DomainError, TokenError, ValidationError};
use crate::repositories::{TokenStore, UserRepository};
use crate::services::session::SessionManager;

use super::password::PasswordHasher;
use super::types::{ChangePassword, Credentials, Registration};

/// Longest accepted name or email
const MAX_FIELD_LENGTH: usize = 255;

/// Authentication gateway over the session manager and the user store
pub struct AuthService<S: TokenStore, U: UserRepository> {
    sessions: SessionManager<S, U>,
    users: Arc<U>,
    hasher: PasswordHasher,
    config: AuthConfig,
}

impl<S: TokenStore, U: UserRepository> AuthService<S, U> {
    /// Creates a new authentication service
    ///
    /// # Arguments
    ///
    /// * `sessions` - Session manager owning the token buckets
    /// * `users` - User store, the same one the session manager uses
    /// * `config` - Password hashing cost and policy
    pub fn new(sessions: SessionManager<S, U>, users: Arc<U>, config: AuthConfig) -> Self {
        Self {
            sessions,
            users,
            hasher: PasswordHasher::new(config.bcrypt_cost),
            config,
        }
    }

    /// Underlying session manager
    pub fn sessions(&self) -> &SessionManager<S, U> {
        &self.sessions
    }

    /// Creates an account
    ///
    /// # Returns
    ///
    /// * `Ok(User)` - The stored user
    /// * `Err(ValidationError)` - Missing name, bad email, short or unconfirmed password
    /// * `Err(AuthError::UserAlreadyExists)` - Email already registered
    pub async fn register(&self, registration: Registration) -> Result<User, DomainError> {
        let name = registration.name.trim();
        if name.is_empty() {
            return Err(required("name"));
        }
        if name.chars().count() > MAX_FIELD_LENGTH {
            return Err(invalid("name"));
        }

        let email = registration.email.trim();
        if email.is_empty() {
            return Err(required("email"));
        }
        if !is_valid_email(email) {
            return Err(invalid("email"));
        }

        self.check_new_password(
            "password",
            &registration.password,
            &registration.password_confirmation,
        )?;

        if self.users.find_by_email(email).await?.is_some() {
            return Err(AuthError::UserAlreadyExists.into());
        }

        let password_hash = self.hasher.hash(&registration.password).await?;
        let user = self
            .users
            .create(NewUser::new(name, email, password_hash))
            .await?;

        info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Checks credentials and starts a new session
    ///
    /// Unknown email and wrong password both yield `AuthError::InvalidCredentials`.
    pub async fn login(&self, credentials: Credentials) -> Result<TokenPair, DomainError> {
        if credentials.email.trim().is_empty() {
            return Err(required("email"));
        }
        if credentials.password.is_empty() {
            return Err(required("password"));
        }

        let user = match self.users.find_by_email(credentials.email.trim()).await? {
            Some(user) => user,
            None => {
                warn!("Login attempt for unknown email");
                return Err(AuthError::InvalidCredentials.into());
            }
        };

        if !self
            .hasher
            .verify(&credentials.password, &user.password_hash)
            .await?
        {
            warn!(user_id = user.id, "Login attempt with wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let pair = self.sessions.issue_pair(&user).await?;
        info!(user_id = user.id, "User logged in");
        Ok(pair)
    }

    /// Resolves a bearer access token to its user.
    ///
    /// A token whose owner has been deleted is reported as revoked.
    pub async fn authenticate(&self, access_token: &str) -> Result<User, DomainError> {
        self.sessions
            .validate(access_token, TokenKind::Access)
            .await
            .map_err(|e| match e {
                DomainError::Auth(AuthError::UserNotFound) => TokenError::EvictedOrRevoked.into(),
                other => other,
            })
    }

    /// Ends the session identified by `token`.
    ///
    /// The token is removed from both of the user's buckets; for an access token the
    /// refresh removal only rewrites that bucket with the removal TTL.
    pub async fn logout(&self, user: &User, token: &str) -> Result<(), DomainError> {
        for kind in TokenKind::ALL {
            self.sessions.revoke(user.id, token, kind).await?;
        }

        info!(user_id = user.id, "User logged out");
        Ok(())
    }

    /// Live tokens of the user
    pub async fn list_tokens(&self, user: &User) -> Result<ActiveTokens, DomainError> {
        self.sessions.list_active(user.id).await
    }

    /// Ends every session of the user
    pub async fn revoke_all(&self, user: &User) -> Result<(), DomainError> {
        self.sessions.revoke_all(user.id).await
    }

    /// Exchanges a refresh token for a new pair
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, DomainError> {
        self.sessions.rotate_refresh(refresh_token).await
    }

    /// Replaces the user's password after checking the current one.
    ///
    /// Existing sessions stay live.
    pub async fn change_password(
        &self,
        user: &User,
        change: ChangePassword,
    ) -> Result<(), DomainError> {
        if change.current_password.is_empty() {
            return Err(required("current_password"));
        }
        self.check_new_password(
            "new_password",
            &change.new_password,
            &change.new_password_confirmation,
        )?;

        // Re-read so a hash changed by another session is honoured
        let stored = self
            .users
            .find_by_id(user.id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !self
            .hasher
            .verify(&change.current_password, &stored.password_hash)
            .await?
        {
            warn!(user_id = user.id, "Password change with wrong current password");
            return Err(AuthError::WrongCurrentPassword.into());
        }

        let password_hash = self.hasher.hash(&change.new_password).await?;
        self.users.update_password(user.id, &password_hash).await?;

        info!(user_id = user.id, "Password changed");
        Ok(())
    }

    fn check_new_password(
        &self,
        field: &str,
        password: &str,
        confirmation: &str,
    ) -> Result<(), DomainError> {
        if password.is_empty() {
            return Err(required(field));
        }
        if password.chars().count() < self.config.min_password_length {
            return Err(ValidationError::TooShort {
                field: field.to_string(),
                min: self.config.min_password_length,
            }
            .into());
        }
        if password != confirmation {
            return Err(ValidationError::Mismatch {
                field: field.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

fn required(field: &str) -> DomainError {
    ValidationError::RequiredField {
        field: field.to_string(),
    }
    .into()
}

fn invalid(field: &str) -> DomainError {
    ValidationError::InvalidFormat {
        field: field.to_string(),
    }
    .into()
}

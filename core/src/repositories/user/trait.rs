//! User repository trait defining the identity collaborator.
//!
//! The session logic only ever needs to look users up and replace a password hash;
//! everything else about user storage belongs to the adapter.

use async_trait::async_trait;

use crate::domain::entities::user::{NewUser, User};
use crate::errors::DomainError;

/// Repository trait for User entity persistence operations
///
/// # Example Implementation
/// ```no_run
/// use async_trait::async_trait;
/// use tk_core::domain::entities::user::{NewUser, User};
/// use tk_core::errors::DomainError;
/// use tk_core::repositories::UserRepository;
///
/// struct PostgresUserRepository {
///     // database connection pool
/// }
///
/// #[async_trait]
/// impl UserRepository for PostgresUserRepository {
///     async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
///         // Implementation here
///         Ok(None)
///     }
///
///     // ... other methods
/// #   async fn find_by_email(&self, _: &str) -> Result<Option<User>, DomainError> { Ok(None) }
/// #   async fn create(&self, _: NewUser) -> Result<User, DomainError> { unimplemented!() }
/// #   async fn update_password(&self, _: i64, _: &str) -> Result<(), DomainError> { Ok(()) }
/// }
/// ```
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their unique identifier
    ///
    /// # Returns
    /// * `Ok(Some(User))` - User found
    /// * `Ok(None)` - No user with that id (e.g. deleted after a token was issued)
    /// * `Err(DomainError)` - Database or other error occurred
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError>;

    /// Find a user by login email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Persist a new user
    ///
    /// # Returns
    /// * `Ok(User)` - The stored user with its assigned id
    /// * `Err(DomainError::Auth(AuthError::UserAlreadyExists))` - Email already taken
    async fn create(&self, new_user: NewUser) -> Result<User, DomainError>;

    /// Replace a user's password hash
    ///
    /// # Returns
    /// * `Err(DomainError::Auth(AuthError::UserNotFound))` - No user with that id
    async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), DomainError>;
}

//! In-memory implementation of the UserRepository trait.
//!
//! Used when no `DATABASE_URL` is configured and by the HTTP integration tests.
//! Ids are assigned sequentially from 1; emails are unique case-insensitively.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use tk_core::domain::entities::user::{NewUser, User};
use tk_core::errors::{AuthError, DomainError};
use tk_core::repositories::UserRepository;

#[derive(Default)]
struct Users {
    by_id: HashMap<i64, User>,
    last_id: i64,
}

/// Process-local user store
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<Users>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delete a user
    pub async fn delete(&self, id: i64) -> bool {
        self.users.write().await.by_id.remove(&id).is_some()
    }

    /// Number of stored users
    pub async fn count(&self) -> usize {
        self.users.read().await.by_id.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
        Ok(self.users.read().await.by_id.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users
            .by_id
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, DomainError> {
        let mut users = self.users.write().await;

        if users
            .by_id
            .values()
            .any(|user| user.email.eq_ignore_ascii_case(&new_user.email))
        {
            return Err(AuthError::UserAlreadyExists.into());
        }

        users.last_id += 1;
        let user = new_user.into_user(users.last_id, Utc::now());
        users.by_id.insert(user.id, user.clone());

        debug!(user_id = user.id, "User stored in memory");
        Ok(user)
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), DomainError> {
        let mut users = self.users.write().await;
        let user = users.by_id.get_mut(&id).ok_or(AuthError::UserNotFound)?;
        user.set_password_hash(password_hash.to_string());
        Ok(())
    }
}

//! MySQL implementation of the UserRepository trait.
//!
//! Works against the `users` table created by `migrations/0001_create_users.sql`;
//! the password hash lives in the `password` column.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use tracing::debug;

use tk_core::domain::entities::user::{NewUser, User};
use tk_core::errors::{AuthError, DomainError};
use tk_core::repositories::UserRepository;

use crate::InfrastructureError;

const SELECT_USER: &str = r#"
    SELECT id, name, email, password, created_at, updated_at
    FROM users
"#;

/// MySQL implementation of UserRepository
pub struct MySqlUserRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlUserRepository {
    /// Create a new MySQL user repository
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to User entity
    fn row_to_user(row: &sqlx::mysql::MySqlRow) -> Result<User, InfrastructureError> {
        Ok(User {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
        })
    }
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
        let query = format!("{} WHERE id = ? LIMIT 1", SELECT_USER);

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(InfrastructureError::Database)?;

        Ok(row.as_ref().map(Self::row_to_user).transpose()?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let query = format!("{} WHERE email = ? LIMIT 1", SELECT_USER);

        let row = sqlx::query(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(InfrastructureError::Database)?;

        Ok(row.as_ref().map(Self::row_to_user).transpose()?)
    }

    async fn create(&self, new_user: NewUser) -> Result<User, DomainError> {
        let query = r#"
            INSERT INTO users (name, email, password, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
        "#;

        let now = Utc::now();
        let result = sqlx::query(query)
            .bind(&new_user.name)
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await;

        let done = match result {
            Ok(done) => done,
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(AuthError::UserAlreadyExists.into());
            }
            Err(e) => return Err(InfrastructureError::Database(e).into()),
        };

        let id = i64::try_from(done.last_insert_id())
            .map_err(|_| DomainError::internal("user id out of range"))?;
        debug!(user_id = id, "User inserted");

        Ok(new_user.into_user(id, now))
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), DomainError> {
        let query = r#"
            UPDATE users
            SET password = ?, updated_at = ?
            WHERE id = ?
        "#;

        let result = sqlx::query(query)
            .bind(password_hash)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(InfrastructureError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound.into());
        }
        Ok(())
    }
}

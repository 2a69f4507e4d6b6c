//! Domain-specific error types and error handling.

mod types;


// Re-export all error types
pub use types::{AuthError, TokenError, ValidationError};

use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug)]
pub enum DomainError {
    /// The backing TTL store or user store could not be reached.
    /// Fatal to the current operation; never read as "no tokens".
    #[error("Store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl DomainError {
    /// True for any token rejection that must be reported as a plain "unauthorized"
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            DomainError::Token(
                TokenError::MalformedToken
                    | TokenError::ExpiredToken
                    | TokenError::WrongKind
                    | TokenError::EvictedOrRevoked
            )
        )
    }

    /// Shorthand for an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        DomainError::Internal {
            message: message.into(),
        }
    }

    /// Shorthand for a store outage
    pub fn store_unavailable(message: impl Into<String>) -> Self {
        DomainError::StoreUnavailable {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Internal {
            message: format!("Serialization error: {}", err),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

//! Domain-specific error types for token handling, authentication and validation
//!
//! The internal distinctions between token failures exist for logging and tests.
//! The presentation layer collapses them into a single unauthorized response.

use thiserror::Error;

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Not decodable as a token payload
    #[error("Malformed token")]
    MalformedToken,

    #[error("Token expired")]
    ExpiredToken,

    /// An access token used where a refresh token was expected, or vice versa
    #[error("Wrong token kind")]
    WrongKind,

    /// Well-formed and unexpired but no longer live in its bucket
    #[error("Token evicted or revoked")]
    EvictedOrRevoked,

    /// Refresh token already consumed by an earlier rotation
    #[error("Token already used or not found")]
    ReplayedRefresh,
}

/// Authentication-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email or wrong password; the two are never distinguished
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Current password is incorrect")]
    WrongCurrentPassword,
}

/// Validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field: {field}")]
    RequiredField { field: String },

    #[error("Invalid format: {field}")]
    InvalidFormat { field: String },

    #[error("Too short: {field} (min: {min})")]
    TooShort { field: String, min: usize },

    #[error("Confirmation does not match: {field}")]
    Mismatch { field: String },
}

impl ValidationError {
    /// Name of the offending field
    pub fn field(&self) -> &str {
        match self {
            ValidationError::RequiredField { field }
            | ValidationError::InvalidFormat { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::Mismatch { field } => field,
        }
    }
}

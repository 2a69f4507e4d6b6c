//! # TokenKeeper Core
//!
//! Session logic and domain layer for the TokenKeeper server.
//! This crate contains the token codec, the bounded per-user token store, the session
//! manager that owns every token lifecycle rule, the authentication service sitting on
//! top of it, and the repository interfaces that infrastructure adapters implement.

pub mod clock;
pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use domain::entities::{ActiveTokens, NewUser, TokenKind, TokenPair, TokenPayload, User};
pub use errors::{AuthError, DomainError, DomainResult, TokenError, ValidationError};
pub use repositories::{bucket_key, BucketTokenStore, CacheStore, TokenStore, UserRepository};
pub use services::{
    AuthService, ChangePassword, Credentials, PasswordHasher, Registration, SessionManager,
    TokenCodec,
};

//! Session manager module
//!
//! Owns every token lifecycle rule:
//! - Issuing access/refresh tokens into bounded buckets
//! - Validating a presented token (shape, kind, expiry, owner, liveness)
//! - One-time refresh token rotation
//! - Revoking one session or all of a user's sessions

mod service;


pub use service::SessionManager;

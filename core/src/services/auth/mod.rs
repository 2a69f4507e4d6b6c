//! Authentication service module
//!
//! The external-facing gateway: registration, credential login, bearer authentication,
//! logout, refresh, bulk revocation and password changes. Token lifecycle work is
//! delegated to the [`SessionManager`](crate::services::session::SessionManager).

mod password;
mod service;
mod types;

#[cfg(test)]
mod tests;

pub use password::PasswordHasher;
pub use service::AuthService;
pub use types::{ChangePassword, Credentials, Registration};

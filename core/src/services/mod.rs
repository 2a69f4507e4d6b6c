//! Business services containing the session and authentication logic.

pub mod auth;
pub mod session;
pub mod token;

// Re-export commonly used types
pub use auth::{AuthService, ChangePassword, Credentials, PasswordHasher, Registration};
pub use session::SessionManager;
pub use token::{generate_nonce, TokenCodec};

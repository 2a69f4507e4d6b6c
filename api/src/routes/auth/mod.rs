//! Authentication route handlers
//!
//! This module contains the account and session endpoints:
//! - Registration and login
//! - Current user lookup
//! - Logout, token listing and revoke-all
//! - Refresh token rotation
//! - Password change

pub mod change_password;
pub mod login;
pub mod logout;
pub mod refresh;
pub mod register;
pub mod tokens;
pub mod user;

pub use change_password::change_password;
pub use login::login;
pub use logout::logout;
pub use refresh::refresh;
pub use register::register;
pub use tokens::{list_tokens, revoke_all};
pub use user::current_user;

//! HTTP route handlers
//!
//! - `auth` - registration, login and session management under `/api`
//! - `info` - health and client information

pub mod auth;
pub mod info;

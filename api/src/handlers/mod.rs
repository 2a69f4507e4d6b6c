//! Request handling helpers shared by the routes

pub mod error;

pub use error::ApiError;

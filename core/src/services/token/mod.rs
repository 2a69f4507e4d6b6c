//! Token codec module
//!
//! Turns a [`TokenPayload`](crate::domain::entities::token::TokenPayload) into the opaque
//! string handed to clients and back.

mod codec;


pub use codec::{generate_nonce, TokenCodec};

//! Domain entities representing core business objects.

pub mod token;
pub mod user;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use token::{ActiveTokens, TokenKind, TokenPair, TokenPayload};
pub use user::{NewUser, User};

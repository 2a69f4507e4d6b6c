//! Repository and store interfaces implemented by infrastructure adapters.

pub mod cache;
pub mod token;
pub mod user;

pub use cache::CacheStore;
pub use token::{bucket_key, BucketTokenStore, TokenStore};
pub use user::UserRepository;

#[cfg(test)]
pub use cache::MockCacheStore;
#[cfg(test)]
pub use user::MockUserRepository;

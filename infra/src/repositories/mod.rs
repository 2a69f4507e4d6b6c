//! In-process repository implementations

pub mod in_memory_user;

pub use in_memory_user::InMemoryUserRepository;

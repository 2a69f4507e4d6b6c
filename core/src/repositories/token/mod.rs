pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;
pub mod bucket;

pub use bucket::{bucket_key, BucketTokenStore, DEFAULT_MAX_WRITE_ATTEMPTS};
pub use r#trait::TokenStore;

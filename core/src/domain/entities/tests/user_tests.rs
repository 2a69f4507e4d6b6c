//! Unit tests for the user entity

use chrono::{Duration, Utc};
use crate::domain::entities::user::NewUser;

#[test]
fn test_new_user_into_user() {
    let now = Utc::now();
    let user = NewUser::new("Ann", "ann@example.com", "$2b$04$hash").into_user(7, now);

    assert_eq!(user.id, 7);
    assert_eq!(user.email, "ann@example.com");
    assert_eq!(user.created_at, user.updated_at);
}

#[test]
fn test_password_hash_is_never_serialized() {
    let user = NewUser::new("Ann", "ann@example.com", "secret-hash").into_user(1, Utc::now());
    let json = serde_json::to_string(&user).unwrap();
    assert!(!json.contains("secret-hash"));
}

#[test]
fn test_set_password_hash_bumps_updated_at() {
    let created = Utc::now() - Duration::days(1);
    let mut user = NewUser::new("Ann", "ann@example.com", "old").into_user(1, created);

    user.set_password_hash("new".to_string());
    assert_eq!(user.password_hash, "new");
    assert!(user.updated_at > user.created_at);
}

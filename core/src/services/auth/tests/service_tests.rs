//! Tests for the authentication service

use std::sync::Arc;

use tk_shared::{AuthConfig, SessionConfig};

use crate::errors::{AuthError, DomainError, TokenError, ValidationError};
use crate::repositories::{BucketTokenStore, MockCacheStore, MockUserRepository, UserRepository};
use crate::services::auth::{AuthService, ChangePassword, Credentials, Registration};
use crate::services::session::SessionManager;

type TestService = AuthService<BucketTokenStore<MockCacheStore>, MockUserRepository>;

fn create_test_service() -> (TestService, Arc<MockUserRepository>) {
    let config = SessionConfig::default();
    let cache = Arc::new(MockCacheStore::new());
    let store = Arc::new(BucketTokenStore::new(cache, config.max_tokens_per_user));
    let users = Arc::new(MockUserRepository::new());
    let sessions = SessionManager::new(store, users.clone(), config);
    let service = AuthService::new(sessions, users.clone(), AuthConfig::default().with_bcrypt_cost(4));
    (service, users)
}

fn registration(email: &str) -> Registration {
    Registration {
        name: "Ann".to_string(),
        email: email.to_string(),
        password: "password123".to_string(),
        password_confirmation: "password123".to_string(),
    }
}

fn credentials(email: &str, password: &str) -> Credentials {
    Credentials {
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_register_hashes_password() {
    let (service, users) = create_test_service();

    let user = service.register(registration("ann@example.com")).await.unwrap();

    assert_eq!(user.name, "Ann");
    let stored = users.find_by_id(user.id).await.unwrap().unwrap();
    assert_ne!(stored.password_hash, "password123");
    assert!(stored.password_hash.starts_with("$2"));
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let (service, _) = create_test_service();
    service.register(registration("ann@example.com")).await.unwrap();

    let result = service.register(registration("ann@example.com")).await;
    assert!(matches!(result, Err(DomainError::Auth(AuthError::UserAlreadyExists))));
}

#[tokio::test]
async fn test_register_validation() {
    let (service, _) = create_test_service();

    let mut short = registration("ann@example.com");
    short.password = "short".to_string();
    short.password_confirmation = "short".to_string();
    assert!(matches!(
        service.register(short).await,
        Err(DomainError::Validation(ValidationError::TooShort { .. }))
    ));

    let mut mismatch = registration("ann@example.com");
    mismatch.password_confirmation = "different123".to_string();
    assert!(matches!(
        service.register(mismatch).await,
        Err(DomainError::Validation(ValidationError::Mismatch { .. }))
    ));

    assert!(matches!(
        service.register(registration("not-an-email")).await,
        Err(DomainError::Validation(ValidationError::InvalidFormat { .. }))
    ));

    let mut nameless = registration("ann@example.com");
    nameless.name = "  ".to_string();
    assert!(matches!(
        service.register(nameless).await,
        Err(DomainError::Validation(ValidationError::RequiredField { .. }))
    ));
}

#[tokio::test]
async fn test_login_issues_working_pair() {
    let (service, _) = create_test_service();
    let user = service.register(registration("ann@example.com")).await.unwrap();

    let pair = service
        .login(credentials("ann@example.com", "password123"))
        .await
        .unwrap();

    let authenticated = service.authenticate(&pair.access_token).await.unwrap();
    assert_eq!(authenticated.id, user.id);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let (service, _) = create_test_service();
    service.register(registration("ann@example.com")).await.unwrap();

    let wrong_password = service.login(credentials("ann@example.com", "wrong-password")).await;
    let unknown_email = service.login(credentials("bob@example.com", "password123")).await;

    assert!(matches!(wrong_password, Err(DomainError::Auth(AuthError::InvalidCredentials))));
    assert!(matches!(unknown_email, Err(DomainError::Auth(AuthError::InvalidCredentials))));
}

#[tokio::test]
async fn test_authenticate_rejects_refresh_token() {
    let (service, _) = create_test_service();
    service.register(registration("ann@example.com")).await.unwrap();
    let pair = service.login(credentials("ann@example.com", "password123")).await.unwrap();

    let result = service.authenticate(&pair.refresh_token).await;
    assert!(matches!(result, Err(DomainError::Token(TokenError::WrongKind))));
}

#[tokio::test]
async fn test_authenticate_for_deleted_user_is_unauthorized() {
    let (service, users) = create_test_service();
    let user = service.register(registration("ann@example.com")).await.unwrap();
    let pair = service.login(credentials("ann@example.com", "password123")).await.unwrap();

    users.remove(user.id).await;

    let error = service.authenticate(&pair.access_token).await.unwrap_err();
    assert!(error.is_unauthorized());
}

#[tokio::test]
async fn test_logout_ends_only_current_session() {
    let (service, _) = create_test_service();
    service.register(registration("ann@example.com")).await.unwrap();
    let phone = service.login(credentials("ann@example.com", "password123")).await.unwrap();
    let laptop = service.login(credentials("ann@example.com", "password123")).await.unwrap();

    let user = service.authenticate(&phone.access_token).await.unwrap();
    service.logout(&user, &phone.access_token).await.unwrap();

    let tokens = service.list_tokens(&user).await.unwrap();
    assert!(!tokens.access_tokens.contains(&phone.access_token));
    assert!(service.authenticate(&phone.access_token).await.is_err());
    assert!(service.authenticate(&laptop.access_token).await.is_ok());
}

#[tokio::test]
async fn test_refresh_rotation_and_replay() {
    let (service, _) = create_test_service();
    service.register(registration("ann@example.com")).await.unwrap();
    let first = service.login(credentials("ann@example.com", "password123")).await.unwrap();

    let second = service.refresh(&first.refresh_token).await.unwrap();
    assert!(service.authenticate(&second.access_token).await.is_ok());

    let replay = service.refresh(&first.refresh_token).await;
    assert!(matches!(replay, Err(DomainError::Token(TokenError::ReplayedRefresh))));
}

#[tokio::test]
async fn test_revoke_all() {
    let (service, _) = create_test_service();
    service.register(registration("ann@example.com")).await.unwrap();
    let pair = service.login(credentials("ann@example.com", "password123")).await.unwrap();
    let user = service.authenticate(&pair.access_token).await.unwrap();

    service.revoke_all(&user).await.unwrap();

    assert!(service.authenticate(&pair.access_token).await.is_err());
    assert!(service.refresh(&pair.refresh_token).await.is_err());
}

#[tokio::test]
async fn test_change_password() {
    let (service, _) = create_test_service();
    service.register(registration("ann@example.com")).await.unwrap();
    let pair = service.login(credentials("ann@example.com", "password123")).await.unwrap();
    let user = service.authenticate(&pair.access_token).await.unwrap();

    service
        .change_password(
            &user,
            ChangePassword {
                current_password: "password123".to_string(),
                new_password: "new-password".to_string(),
                new_password_confirmation: "new-password".to_string(),
            },
        )
        .await
        .unwrap();

    assert!(service.login(credentials("ann@example.com", "password123")).await.is_err());
    assert!(service.login(credentials("ann@example.com", "new-password")).await.is_ok());
    // existing sessions survive a password change
    assert!(service.authenticate(&pair.access_token).await.is_ok());
}

#[tokio::test]
async fn test_change_password_wrong_current() {
    let (service, _) = create_test_service();
    let user = service.register(registration("ann@example.com")).await.unwrap();

    let result = service
        .change_password(
            &user,
            ChangePassword {
                current_password: "not-my-password".to_string(),
                new_password: "new-password".to_string(),
                new_password_confirmation: "new-password".to_string(),
            },
        )
        .await;

    assert!(matches!(result, Err(DomainError::Auth(AuthError::WrongCurrentPassword))));
}

#[tokio::test]
async fn test_change_password_requires_confirmation() {
    let (service, _) = create_test_service();
    let user = service.register(registration("ann@example.com")).await.unwrap();

    let result = service
        .change_password(
            &user,
            ChangePassword {
                current_password: "password123".to_string(),
                new_password: "new-password".to_string(),
                new_password_confirmation: "other-password".to_string(),
            },
        )
        .await;

    assert!(matches!(
        result,
        Err(DomainError::Validation(ValidationError::Mismatch { .. }))
    ));
}

//! Shared fixtures for the HTTP tests
#![allow(dead_code)]

use actix_web::{http::header, web};
use std::sync::Arc;

use tk_api::{AppState, HttpSettings};
use tk_core::{Registration, TokenPair, User};
use tk_infra::{InMemoryUserRepository, MemoryCache};
use tk_shared::{AuthConfig, SessionConfig};

pub const PASSWORD: &str = "correct horse battery";

pub type TestState = web::Data<AppState<MemoryCache, InMemoryUserRepository>>;

/// Application state over in-process stores, plus a handle on the user store
pub fn test_state_with_capacity(max_tokens: usize) -> (TestState, Arc<InMemoryUserRepository>) {
    let users = Arc::new(InMemoryUserRepository::new());
    let state = AppState::new(
        Arc::new(MemoryCache::new()),
        Arc::clone(&users),
        SessionConfig::default().with_max_tokens(max_tokens),
        AuthConfig::default().with_bcrypt_cost(4),
    );
    (web::Data::new(state), users)
}

pub fn test_state() -> (TestState, Arc<InMemoryUserRepository>) {
    test_state_with_capacity(5)
}

pub fn settings() -> HttpSettings {
    HttpSettings::default()
}

pub async fn seed_user(state: &TestState, email: &str) -> User {
    state
        .auth_service
        .register(Registration {
            name: "Test User".to_string(),
            email: email.to_string(),
            password: PASSWORD.to_string(),
            password_confirmation: PASSWORD.to_string(),
        })
        .await
        .expect("seed user")
}

pub async fn login(state: &TestState, email: &str) -> TokenPair {
    state
        .auth_service
        .login(tk_core::Credentials {
            email: email.to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .expect("login")
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

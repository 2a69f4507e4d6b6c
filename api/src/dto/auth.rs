use serde::{Deserialize, Serialize};
use validator::Validate;

use tk_core::{ActiveTokens, ChangePassword, Credentials, Registration, TokenPair, User};

/// Body of `POST /api/register`.
///
/// Missing fields deserialize as empty strings so they are reported as validation
/// errors rather than as an unparseable body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255, message = "The name field is required."))]
    pub name: String,

    #[validate(
        email(message = "The email must be a valid email address."),
        length(max = 255, message = "The email may not be greater than 255 characters.")
    )]
    pub email: String,

    #[validate(length(min = 8, message = "The password must be at least 8 characters."))]
    pub password: String,

    #[validate(must_match = "password")]
    pub password_confirmation: String,
}

impl From<RegisterRequest> for Registration {
    fn from(request: RegisterRequest) -> Self {
        Registration {
            name: request.name,
            email: request.email,
            password: request.password,
            password_confirmation: request.password_confirmation,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "The email field is required."))]
    pub email: String,

    #[validate(length(min = 1, message = "The password field is required."))]
    pub password: String,
}

impl From<LoginRequest> for Credentials {
    fn from(request: LoginRequest) -> Self {
        Credentials {
            email: request.email,
            password: request.password,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "The current password field is required."))]
    pub current_password: String,

    #[validate(length(min = 8, message = "The new password must be at least 8 characters."))]
    pub new_password: String,

    #[validate(must_match = "new_password")]
    pub new_password_confirmation: String,
}

impl From<ChangePasswordRequest> for ChangePassword {
    fn from(request: ChangePasswordRequest) -> Self {
        ChangePassword {
            current_password: request.current_password,
            new_password: request.new_password,
            new_password_confirmation: request.new_password_confirmation,
        }
    }
}

/// Public view of an account; never carries the password hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

impl From<TokenPair> for TokenPairResponse {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }
    }
}

/// Live tokens of the caller, oldest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveTokensResponse {
    pub access_tokens: Vec<String>,
    pub refresh_tokens: Vec<String>,
}

impl From<ActiveTokens> for ActiveTokensResponse {
    fn from(tokens: ActiveTokens) -> Self {
        Self {
            access_tokens: tokens.access_tokens,
            refresh_tokens: tokens.refresh_tokens,
        }
    }
}

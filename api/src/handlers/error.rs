//! Mapping of domain failures onto HTTP responses.
//!
//! Token rejections are collapsed into one generic 401 body; the internal reason is
//! only logged.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::collections::HashMap;
use tracing::{debug, error};

use tk_core::errors::{AuthError, DomainError, TokenError};
use tk_shared::errors::{error_codes, ErrorResponse};

/// Errors a handler or the bearer middleware can produce
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// No usable `Authorization: Bearer` header
    #[error("Missing bearer token")]
    MissingToken,

    /// Request body failed field validation
    #[error("Invalid request: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// Request body could not be parsed
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    fn body(&self) -> ErrorResponse {
        match self {
            ApiError::MissingToken => unauthorized(),
            ApiError::BadRequest(message) => {
                ErrorResponse::new(error_codes::BAD_REQUEST, message.clone())
            }
            ApiError::Validation(errors) => validation_response(errors),
            ApiError::Domain(error) => domain_response(error),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingToken => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Domain(error) => domain_status(error),
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        HttpResponse::build(status).json(self.body())
    }
}

/// HTTP status for a domain error
pub fn domain_status(error: &DomainError) -> StatusCode {
    match error {
        DomainError::Token(_) => StatusCode::UNAUTHORIZED,
        DomainError::Auth(AuthError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
        DomainError::Auth(AuthError::UserNotFound) => StatusCode::NOT_FOUND,
        DomainError::Auth(AuthError::UserAlreadyExists)
        | DomainError::Auth(AuthError::WrongCurrentPassword)
        | DomainError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::StoreUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        DomainError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn domain_response(error: &DomainError) -> ErrorResponse {
    match error {
        DomainError::Token(TokenError::ReplayedRefresh) => ErrorResponse::new(
            error_codes::TOKEN_REUSED,
            "Token already used or not found",
        ),
        DomainError::Token(_) => unauthorized(),
        DomainError::Auth(AuthError::InvalidCredentials) => {
            ErrorResponse::new(error_codes::INVALID_CREDENTIALS, "Invalid credentials")
        }
        DomainError::Auth(AuthError::UserNotFound) => {
            ErrorResponse::new(error_codes::USER_NOT_FOUND, "User not found")
        }
        DomainError::Auth(AuthError::UserAlreadyExists) => field_error(
            "email",
            "The email has already been taken.",
        ),
        DomainError::Auth(AuthError::WrongCurrentPassword) => field_error(
            "current_password",
            "The current password is incorrect.",
        ),
        DomainError::Validation(validation) => {
            field_error(validation.field(), &validation.to_string())
        }
        DomainError::StoreUnavailable { .. } => ErrorResponse::new(
            error_codes::STORE_UNAVAILABLE,
            "Session store temporarily unavailable",
        ),
        DomainError::Internal { .. } => {
            ErrorResponse::new(error_codes::INTERNAL_ERROR, "An internal error occurred")
        }
    }
}

fn unauthorized() -> ErrorResponse {
    ErrorResponse::new(error_codes::UNAUTHORIZED, "Unauthorized")
}

fn field_error(field: &str, message: &str) -> ErrorResponse {
    ErrorResponse::new(error_codes::VALIDATION_ERROR, "The given data was invalid.")
        .add_detail(field, vec![message])
}

fn validation_response(errors: &validator::ValidationErrors) -> ErrorResponse {
    let details = errors
        .field_errors()
        .into_iter()
        .map(|(field, field_errors)| {
            let messages: Vec<String> = field_errors
                .iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("The {} field is invalid.", field),
                })
                .collect();
            (field.to_string(), serde_json::json!(messages))
        })
        .collect::<HashMap<_, _>>();

    ErrorResponse::with_details(
        error_codes::VALIDATION_ERROR,
        "The given data was invalid.",
        details,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tk_core::errors::ValidationError;

    fn status_of(error: DomainError) -> StatusCode {
        ApiError::from(error).status_code()
    }

    #[test]
    fn test_token_rejections_are_unauthorized() {
        for reason in [
            TokenError::MalformedToken,
            TokenError::ExpiredToken,
            TokenError::WrongKind,
            TokenError::EvictedOrRevoked,
            TokenError::ReplayedRefresh,
        ] {
            assert_eq!(status_of(reason.into()), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_token_rejection_reason_is_not_leaked() {
        let expired = ApiError::from(DomainError::from(TokenError::ExpiredToken)).body();
        let revoked = ApiError::from(DomainError::from(TokenError::EvictedOrRevoked)).body();

        assert_eq!(expired.error, error_codes::UNAUTHORIZED);
        assert_eq!(expired.message, revoked.message);
    }

    #[test]
    fn test_replayed_refresh_has_its_own_code() {
        let body = ApiError::from(DomainError::from(TokenError::ReplayedRefresh)).body();
        assert_eq!(body.error, error_codes::TOKEN_REUSED);
    }

    #[test]
    fn test_auth_error_statuses() {
        assert_eq!(status_of(AuthError::UserNotFound.into()), StatusCode::NOT_FOUND);
        assert_eq!(status_of(AuthError::InvalidCredentials.into()), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(AuthError::UserAlreadyExists.into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(AuthError::WrongCurrentPassword.into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_duplicate_email_is_reported_on_email_field() {
        let body = ApiError::from(DomainError::from(AuthError::UserAlreadyExists)).body();
        let details = body.details.unwrap();
        assert_eq!(details["email"][0], "The email has already been taken.");
    }

    #[test]
    fn test_validation_error_carries_field() {
        let error = DomainError::from(ValidationError::TooShort {
            field: "password".to_string(),
            min: 8,
        });
        assert_eq!(status_of(error), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_infrastructure_statuses() {
        assert_eq!(
            status_of(DomainError::store_unavailable("redis down")),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_of(DomainError::internal("boom")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_missing_token_is_unauthorized() {
        assert_eq!(ApiError::MissingToken.status_code(), StatusCode::UNAUTHORIZED);
    }
}

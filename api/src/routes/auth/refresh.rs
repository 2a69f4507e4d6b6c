use actix_web::{web, HttpResponse};

use tk_core::{CacheStore, UserRepository};

use crate::app::AppState;
use crate::dto::auth::TokenPairResponse;
use crate::handlers::ApiError;
use crate::middleware::auth::BearerToken;

/// Handler for POST /api/refresh
///
/// Exchanges the refresh token sent as the bearer credential for a new pair. The
/// presented token is consumed and cannot be used again.
///
/// # Headers
///
/// ```text
/// Authorization: Bearer {refresh_token}
/// ```
///
/// # Response
///
/// ## Success (200 OK)
/// ```json
/// { "access_token": "...", "refresh_token": "..." }
/// ```
///
/// ## Errors
/// - 401 Unauthorized: Invalid, expired or already used refresh token
/// - 404 Not Found: The token's owner no longer exists
pub async fn refresh<C, U>(
    state: web::Data<AppState<C, U>>,
    token: BearerToken,
) -> Result<HttpResponse, ApiError>
where
    C: CacheStore + 'static,
    U: UserRepository + 'static,
{
    let pair = state.auth_service.refresh(&token.0).await?;
    Ok(HttpResponse::Ok().json(TokenPairResponse::from(pair)))
}

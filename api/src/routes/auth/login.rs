use actix_web::{web, HttpResponse};
use validator::Validate;

use tk_core::{CacheStore, UserRepository};

use crate::app::AppState;
use crate::dto::auth::{LoginRequest, TokenPairResponse};
use crate::handlers::ApiError;

/// Handler for POST /api/login
///
/// Issues an access token and a refresh token.
///
/// ## Errors
/// - 401 Unauthorized: Unknown email or wrong password
/// - 422 Unprocessable Entity: Missing fields
pub async fn login<C, U>(
    state: web::Data<AppState<C, U>>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError>
where
    C: CacheStore + 'static,
    U: UserRepository + 'static,
{
    let request = request.into_inner();
    request.validate()?;

    let pair = state.auth_service.login(request.into()).await?;
    Ok(HttpResponse::Ok().json(TokenPairResponse::from(pair)))
}

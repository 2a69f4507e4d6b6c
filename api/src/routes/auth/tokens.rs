use actix_web::{web, HttpResponse};

use tk_core::{CacheStore, UserRepository};
use tk_shared::MessageResponse;

use crate::app::AppState;
use crate::dto::auth::ActiveTokensResponse;
use crate::handlers::ApiError;
use crate::middleware::auth::AuthContext;

/// Handler for GET /api/tokens
///
/// Lists the caller's live access and refresh tokens, oldest first.
pub async fn list_tokens<C, U>(
    state: web::Data<AppState<C, U>>,
    auth: AuthContext,
) -> Result<HttpResponse, ApiError>
where
    C: CacheStore + 'static,
    U: UserRepository + 'static,
{
    let tokens = state.auth_service.list_tokens(&auth.user).await?;
    Ok(HttpResponse::Ok().json(ActiveTokensResponse::from(tokens)))
}

/// Handler for POST /api/revoke
///
/// Ends every session of the caller, including the one used for this request.
pub async fn revoke_all<C, U>(
    state: web::Data<AppState<C, U>>,
    auth: AuthContext,
) -> Result<HttpResponse, ApiError>
where
    C: CacheStore + 'static,
    U: UserRepository + 'static,
{
    state.auth_service.revoke_all(&auth.user).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("All tokens revoked")))
}

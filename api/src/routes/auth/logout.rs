use actix_web::{web, HttpResponse};

use tk_core::{CacheStore, UserRepository};
use tk_shared::MessageResponse;

use crate::app::AppState;
use crate::handlers::ApiError;
use crate::middleware::auth::AuthContext;

/// Handler for POST /api/logout
///
/// Revokes the access token the request was made with. Other sessions of the user
/// stay live.
///
/// # Headers
///
/// ```text
/// Authorization: Bearer {access_token}
/// ```
///
/// ## Errors
/// - 401 Unauthorized: Missing, expired or revoked access token
/// - 503 Service Unavailable: Token store unreachable
pub async fn logout<C, U>(
    state: web::Data<AppState<C, U>>,
    auth: AuthContext,
) -> Result<HttpResponse, ApiError>
where
    C: CacheStore + 'static,
    U: UserRepository + 'static,
{
    state.auth_service.logout(&auth.user, &auth.token).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Logged out successfully")))
}

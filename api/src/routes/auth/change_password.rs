use actix_web::{web, HttpResponse};
use validator::Validate;

use tk_core::{CacheStore, UserRepository};
use tk_shared::MessageResponse;

use crate::app::AppState;
use crate::dto::auth::ChangePasswordRequest;
use crate::handlers::ApiError;
use crate::middleware::auth::AuthContext;

/// Handler for POST /api/change-password
///
/// ## Errors
/// - 401 Unauthorized: Missing or invalid access token
/// - 422 Unprocessable Entity: Wrong current password, short or unconfirmed new password
pub async fn change_password<C, U>(
    state: web::Data<AppState<C, U>>,
    auth: AuthContext,
    request: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, ApiError>
where
    C: CacheStore + 'static,
    U: UserRepository + 'static,
{
    let request = request.into_inner();
    request.validate()?;

    state
        .auth_service
        .change_password(&auth.user, request.into())
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Password changed successfully")))
}

use actix_web::{web, HttpResponse};
use validator::Validate;

use tk_core::{CacheStore, UserRepository};

use crate::app::AppState;
use crate::dto::auth::{RegisterRequest, UserResponse};
use crate::handlers::ApiError;

/// Handler for POST /api/register
///
/// # Request Body
///
/// ```json
/// {
///     "name": "Ada",
///     "email": "ada@example.com",
///     "password": "correct horse",
///     "password_confirmation": "correct horse"
/// }
/// ```
///
/// # Response
///
/// ## Success (201 Created)
/// ```json
/// { "id": 1, "name": "Ada", "email": "ada@example.com" }
/// ```
///
/// ## Errors
/// - 422 Unprocessable Entity: Invalid fields or email already taken
pub async fn register<C, U>(
    state: web::Data<AppState<C, U>>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError>
where
    C: CacheStore + 'static,
    U: UserRepository + 'static,
{
    let request = request.into_inner();
    request.validate()?;

    let user = state.auth_service.register(request.into()).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

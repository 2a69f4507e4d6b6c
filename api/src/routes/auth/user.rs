use actix_web::HttpResponse;

use crate::dto::auth::UserResponse;
use crate::middleware::auth::AuthContext;

/// Handler for GET /api/user
pub async fn current_user(auth: AuthContext) -> HttpResponse {
    HttpResponse::Ok().json(UserResponse::from(&auth.user))
}

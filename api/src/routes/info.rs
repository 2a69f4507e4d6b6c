//! Health and client information endpoints

use actix_web::{http::header, web, HttpRequest, HttpResponse};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Instant;

use tk_core::{CacheStore, UserRepository};
use tk_shared::{
    error_codes, ClientInfo, DatabaseInfo, ErrorResponse, HealthResponse, HealthStatus, ServerInfo,
    ServiceHealth,
};

use crate::app::AppState;

/// Handler for GET /health
///
/// Reports 503 when the token store cannot be reached.
pub async fn health<C, U>(state: web::Data<AppState<C, U>>) -> HttpResponse
where
    C: CacheStore + 'static,
    U: UserRepository + 'static,
{
    let started = Instant::now();
    let token_store = match state.cache.health_check().await {
        Ok(()) => ServiceHealth::healthy(started.elapsed().as_millis() as u64),
        Err(e) => ServiceHealth::unhealthy(e.to_string()),
    };

    let mut services = HashMap::new();
    services.insert("token_store".to_string(), token_store);

    let response = HealthResponse::from_services(services, env!("CARGO_PKG_VERSION"));
    match response.status {
        HealthStatus::Unhealthy => HttpResponse::ServiceUnavailable().json(response),
        _ => HttpResponse::Ok().json(response),
    }
}

/// Handler for GET /info/client
///
/// Echoes the caller's address (honouring `Forwarded`/`X-Forwarded-For`) and user agent.
pub async fn client_info(req: HttpRequest) -> HttpResponse {
    let ip = req
        .connection_info()
        .realip_remote_addr()
        .map(strip_port);
    let user_agent = req
        .headers()
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(String::from);

    HttpResponse::Ok().json(ClientInfo { ip, user_agent })
}

/// Handler for GET /info/server
pub async fn server_info() -> HttpResponse {
    HttpResponse::Ok().json(ServerInfo::current(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    ))
}

/// Handler for GET /info/database
pub async fn database_info(database: web::Data<DatabaseInfo>) -> HttpResponse {
    HttpResponse::Ok().json(database.get_ref())
}

/// Default handler for unknown routes
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(ErrorResponse::new(
        error_codes::NOT_FOUND,
        "The requested resource was not found",
    ))
}

fn strip_port(addr: &str) -> String {
    match addr.parse::<SocketAddr>() {
        Ok(socket) => socket.ip().to_string(),
        Err(_) => addr.to_string(),
    }
}

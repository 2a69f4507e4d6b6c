//! CORS configuration for browser clients.
//!
//! Development accepts any origin. Staging and production only accept the origins
//! listed in `ServerConfig::allowed_origins`.

use actix_cors::Cors;
use actix_web::http::{header, Method};
use tracing::info;

use tk_shared::Environment;

/// Preflight cache lifetime in seconds
const MAX_AGE: usize = 3600;

/// Creates a CORS middleware instance configured for `environment`
pub fn create_cors(environment: Environment, allowed_origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec![Method::GET, Method::POST, Method::OPTIONS])
        .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
        .expose_headers(vec![header::HeaderName::from_static("x-request-id")])
        .max_age(MAX_AGE);

    if environment.is_development() {
        info!("Configuring permissive CORS for development");
        return cors.allow_any_origin();
    }

    allowed_origins.iter().fold(cors, |cors, origin| {
        info!(origin = %origin, "Adding allowed origin");
        cors.allowed_origin(origin)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, web, App, HttpResponse};

    async fn preflight(environment: Environment, origin: &str) -> StatusCode {
        let origins = vec!["https://app.example.com".to_string()];
        let app = test::init_service(
            App::new()
                .wrap(create_cors(environment, &origins))
                .route("/api/user", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let req = test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/api/user")
            .insert_header((header::ORIGIN, origin))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "GET"))
            .to_request();
        test::call_service(&app, req).await.status()
    }

    #[actix_web::test]
    async fn test_development_accepts_any_origin() {
        assert_eq!(
            preflight(Environment::Development, "http://localhost:3000").await,
            StatusCode::OK
        );
    }

    #[actix_web::test]
    async fn test_production_accepts_listed_origin_only() {
        assert_eq!(
            preflight(Environment::Production, "https://app.example.com").await,
            StatusCode::OK
        );
        assert_ne!(
            preflight(Environment::Production, "https://evil.example.com").await,
            StatusCode::OK
        );
    }
}

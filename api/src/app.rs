//! Application state and factory
//!
//! This module wires the session engine over a cache and a user store, and provides
//! the factory for creating the Actix-web application.

use std::sync::Arc;

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    web, App, Error,
};
use tracing_actix_web::TracingLogger;

use tk_core::{AuthService, BucketTokenStore, CacheStore, SessionManager, UserRepository};
use tk_shared::{AuthConfig, DatabaseInfo, Environment, SessionConfig};

use crate::handlers::ApiError;
use crate::middleware::{create_cors, Authenticator, BearerAuth, SecurityMiddleware};
use crate::routes::{auth, info};

/// Auth service over buckets kept in `C`, with users from `U`
pub type TokenAuthService<C, U> = AuthService<BucketTokenStore<C>, U>;

/// Application state that holds shared services
pub struct AppState<C: CacheStore, U: UserRepository> {
    pub auth_service: Arc<TokenAuthService<C, U>>,
    /// Backing store of the token buckets, probed by the health check
    pub cache: Arc<C>,
}

impl<C, U> AppState<C, U>
where
    C: CacheStore + 'static,
    U: UserRepository + 'static,
{
    /// Builds the token store, session manager and auth service
    pub fn new(cache: Arc<C>, users: Arc<U>, session: SessionConfig, auth: AuthConfig) -> Self {
        let store = Arc::new(BucketTokenStore::new(
            Arc::clone(&cache),
            session.max_tokens_per_user,
        ));
        let sessions = SessionManager::new(store, Arc::clone(&users), session);

        Self::from_service(Arc::new(AuthService::new(sessions, users, auth)), cache)
    }

    /// Wraps an already configured auth service
    pub fn from_service(auth_service: Arc<TokenAuthService<C, U>>, cache: Arc<C>) -> Self {
        Self {
            auth_service,
            cache,
        }
    }

    /// The auth service as seen by the bearer middleware
    pub fn authenticator(&self) -> Arc<dyn Authenticator> {
        self.auth_service.clone()
    }
}

/// HTTP settings that do not belong to the session engine
#[derive(Debug, Clone, Default)]
pub struct HttpSettings {
    pub environment: Environment,
    pub allowed_origins: Vec<String>,
    /// Reported by `GET /info/database`
    pub database: DatabaseInfo,
}

/// Create and configure the application with all dependencies
pub fn create_app<C, U>(
    app_state: web::Data<AppState<C, U>>,
    settings: &HttpSettings,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
>
where
    C: CacheStore + 'static,
    U: UserRepository + 'static,
{
    let authenticator = web::Data::new(app_state.authenticator());
    let database_info = web::Data::new(settings.database.clone());
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into());

    App::new()
        // Add application state
        .app_data(app_state)
        .app_data(authenticator)
        .app_data(database_info)
        .app_data(json_config)
        // The last wrap is the outermost layer
        .wrap(SecurityMiddleware::new(settings.environment))
        .wrap(create_cors(settings.environment, &settings.allowed_origins))
        .wrap(TracingLogger::default())
        .route("/health", web::get().to(info::health::<C, U>))
        .service(
            web::scope("/info")
                .route("/server", web::get().to(info::server_info))
                .route("/client", web::get().to(info::client_info))
                .route("/database", web::get().to(info::database_info)),
        )
        .service(
            web::scope("/api")
                .route("/register", web::post().to(auth::register::<C, U>))
                .route("/login", web::post().to(auth::login::<C, U>))
                // Consumes a refresh token, so not behind the access-token middleware
                .route("/refresh", web::post().to(auth::refresh::<C, U>))
                .route(
                    "/user",
                    web::get().to(auth::current_user).wrap(BearerAuth::new()),
                )
                .route(
                    "/logout",
                    web::post().to(auth::logout::<C, U>).wrap(BearerAuth::new()),
                )
                .route(
                    "/tokens",
                    web::get().to(auth::list_tokens::<C, U>).wrap(BearerAuth::new()),
                )
                .route(
                    "/revoke",
                    web::post().to(auth::revoke_all::<C, U>).wrap(BearerAuth::new()),
                )
                .route(
                    "/change-password",
                    web::post()
                        .to(auth::change_password::<C, U>)
                        .wrap(BearerAuth::new()),
                ),
        )
        // Default 404 handler
        .default_service(web::route().to(info::not_found))
}

use actix_web::{web, HttpServer};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use tk_api::{create_app, telemetry, AppState, HttpSettings};
use tk_core::{CacheStore, UserRepository};
use tk_infra::{DatabasePool, InMemoryUserRepository, MemoryCache, MySqlUserRepository, RedisCache};
use tk_shared::{AppConfig, CacheBackend};

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    telemetry::init_tracing(&config.logging);

    info!(environment = %config.environment, "Starting TokenKeeper API server");

    match config.cache.backend {
        CacheBackend::Memory => {
            info!("Using in-process token store");
            let cache = Arc::new(MemoryCache::new());
            cache.spawn_purger(Duration::from_secs(config.cache.purge_interval_secs));
            with_users(config, cache).await
        }
        CacheBackend::Redis => {
            let cache = RedisCache::new(config.cache.clone())
                .await
                .map_err(startup_error)?;
            with_users(config, Arc::new(cache)).await
        }
    }
}

/// Picks the user store: MySQL when a database URL is configured, in-memory otherwise
async fn with_users<C>(config: AppConfig, cache: Arc<C>) -> io::Result<()>
where
    C: CacheStore + 'static,
{
    if config.database.url.is_none() {
        info!("DATABASE_URL not set, using in-memory user store");
        return serve(config, cache, Arc::new(InMemoryUserRepository::new())).await;
    }

    let database = DatabasePool::new(&config.database)
        .await
        .map_err(startup_error)?;
    database.ensure_schema().await.map_err(startup_error)?;

    let users = Arc::new(MySqlUserRepository::new(database.pool().clone()));
    serve(config, cache, users).await
}

async fn serve<C, U>(config: AppConfig, cache: Arc<C>, users: Arc<U>) -> io::Result<()>
where
    C: CacheStore + 'static,
    U: UserRepository + 'static,
{
    let bind_address = config.server.bind_address();
    let settings = HttpSettings {
        environment: config.environment,
        allowed_origins: config.server.allowed_origins.clone(),
        database: config.database.info(),
    };
    let state = web::Data::new(AppState::new(cache, users, config.session, config.auth));

    info!(address = %bind_address, "Server will bind");

    HttpServer::new(move || create_app(state.clone(), &settings))
        .bind(&bind_address)?
        .run()
        .await
}

fn startup_error(err: tk_infra::InfrastructureError) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err)
}

use anyhow::Result;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod error;
mod jwt;
mod middleware;
mod password;
mod repositories;
mod routes;
mod state;
mod validation;

use common::{
    database::{DatabaseConfig, health_check, init_pool},
    identity::Authenticator,
    repositories::{PgRoleRepository, PgUserRepository},
    settings::ServerConfig,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;

use crate::{
    jwt::{JwtConfig, JwtService},
    repositories::CredentialRepository,
    state::AppState,
};

const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    info!("Starting authentication service");

    let server_config = ServerConfig::from_env(DEFAULT_PORT)?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Initialize JWT service
    let jwt_service = JwtService::new(JwtConfig::from_env()?)?;

    let roles = Arc::new(PgRoleRepository::new(pool.clone()));
    let authenticator = Authenticator::new(
        jwt_service.verifier().clone(),
        Arc::new(PgUserRepository::new(pool.clone())),
        roles.clone(),
    );

    let app_state = AppState {
        jwt_service,
        authenticator,
        credentials: CredentialRepository::new(pool),
        roles,
        rate_limiter: server_config.rate_limiter()?,
    };

    info!("Authentication service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state)
        .layer(server_config.cors_layer()?)
        .layer(TraceLayer::new_for_http());

    let address = server_config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("Authentication service listening on {}", address);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

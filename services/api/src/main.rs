use anyhow::Result;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod middleware;
mod models;
mod repositories;
mod routes;
mod state;

use common::{
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
    identity::Authenticator,
    repositories::{PgRoleRepository, PgUserRepository},
    roles::{default_roles, validate_role_definitions},
    settings::ServerConfig,
    token::TokenVerifier,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;

use crate::{
    config::ApiConfig,
    repositories::{DepartmentRepository, DocumentRepository, EmployeeRepository},
    state::AppState,
};

const DEFAULT_PORT: u16 = 3001;

/// Validate the built-in catalogue and upsert it
async fn seed_roles(roles: &PgRoleRepository) -> Result<()> {
    let catalogue = default_roles();
    validate_role_definitions(&catalogue)?;

    for role in &catalogue {
        roles.upsert(role).await?;
    }

    info!("Seeded {} roles", catalogue.len());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    info!("Starting API service");

    let server_config = ServerConfig::from_env(DEFAULT_PORT)?;
    let api_config = ApiConfig::from_env()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool).await?;

    let roles = PgRoleRepository::new(pool.clone());
    if api_config.seed_roles {
        seed_roles(&roles).await?;
    }

    let authenticator = Authenticator::new(
        TokenVerifier::from_env()?,
        Arc::new(PgUserRepository::new(pool.clone())),
        Arc::new(roles),
    );

    let app_state = AppState {
        authenticator,
        employees: EmployeeRepository::new(pool.clone()),
        departments: DepartmentRepository::new(pool.clone()),
        documents: DocumentRepository::new(pool),
        rate_limiter: server_config.rate_limiter()?,
    };

    info!("API service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state)
        .layer(server_config.cors_layer()?)
        .layer(TraceLayer::new_for_http());

    let address = server_config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("API service listening on {}", address);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

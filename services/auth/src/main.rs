//! Authentication service entry point
//!
//! Owns construction and lifecycle of every external connection and injects
//! them into the service; nothing below this layer reads the environment.

use anyhow::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use auth::audit::AuditLog;
use auth::jwt::{JwtConfig, JwtService};
use auth::mailer::{self, MailerConfig};
use auth::repositories::UserRepository;
use auth::routes;
use auth::service::AuthService;
use auth::AppState;
use common::cache::{RedisConfig, RedisPool};
use common::database::{self, DatabaseConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting authentication service");

    // Database
    let db_config = DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;
    database::run_migrations(&pool, &sqlx::migrate!()).await?;

    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Redis
    let redis_config = RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config)?;

    // Token issuer
    let jwt_config = JwtConfig::from_env()?;
    let jwt_service = JwtService::new(&jwt_config);

    // Notification gateway
    let mailer_config = MailerConfig::from_env();
    let mailer = mailer::from_config(&mailer_config);

    let auth_service = AuthService::new(
        UserRepository::new(pool.clone()),
        redis_pool,
        mailer,
        jwt_service.clone(),
        AuditLog::new(),
        mailer_config.public_base_url.clone(),
    );

    let state = AppState {
        auth_service: Arc::new(auth_service),
        jwt_service,
    };

    let app = routes::create_router(state);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&bind_addr).await?;
    info!("Authentication service listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

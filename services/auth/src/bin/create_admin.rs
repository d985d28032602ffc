//! Seed a pre-verified admin user
//!
//! Exits quietly when an ADMIN already exists; otherwise inserts one with
//! credentials from the environment. Meant to be run once per deployment,
//! after migrations.

use anyhow::Result;
use sqlx::Row;
use tracing::info;
use tracing_subscriber::EnvFilter;

use auth::service::hash_password;
use common::database::{self, DatabaseConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let admin_email = std::env::var("ADMIN_EMAIL")
        .map_err(|_| anyhow::anyhow!("ADMIN_EMAIL environment variable not set"))?;
    let admin_password = std::env::var("ADMIN_PASSWORD")
        .map_err(|_| anyhow::anyhow!("ADMIN_PASSWORD environment variable not set"))?;
    let admin_full_name =
        std::env::var("ADMIN_FULL_NAME").unwrap_or_else(|_| "Admin User".to_string());

    let db_config = DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;
    database::run_migrations(&pool, &sqlx::migrate!()).await?;

    let existing = sqlx::query("SELECT email FROM users WHERE role = 'ADMIN' LIMIT 1")
        .fetch_optional(&pool)
        .await?;

    if let Some(row) = existing {
        let email: String = row.get("email");
        info!(email = %email, "admin user already exists, nothing to do");
        return Ok(());
    }

    let password_hash = hash_password(&admin_password)?;

    sqlx::query(
        "INSERT INTO users (full_name, email, password_hash, is_verified, role) \
         VALUES ($1, $2, $3, TRUE, 'ADMIN')",
    )
    .bind(&admin_full_name)
    .bind(&admin_email)
    .bind(&password_hash)
    .execute(&pool)
    .await?;

    info!(email = %admin_email, "admin user created");
    Ok(())
}

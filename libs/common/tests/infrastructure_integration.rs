//! Integration tests for the infrastructure components
//!
//! These tests verify that the PostgreSQL database and Redis cache are
//! reachable with the configured environment and behave as the services
//! expect. They require live instances and are skipped in environments
//! without DATABASE_URL / REDIS_URL.

use common::{
    cache::{RedisConfig, RedisPool},
    database::{health_check, init_pool, DatabaseConfig},
};
use sqlx::Row;

#[tokio::test]
#[ignore = "requires live PostgreSQL and Redis"]
async fn infrastructure_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    assert!(health_check(&pool).await?, "database health check failed");

    let row = sqlx::query("SELECT 1 AS result").fetch_one(&pool).await?;
    let result: i32 = row.get("result");
    assert_eq!(result, 1);

    let redis_config = RedisConfig::from_env()?;
    let cache = RedisPool::new(&redis_config)?;

    assert!(cache.health_check().await?, "redis health check failed");

    let key = "infrastructure_test_key";
    cache.set_ex(key, "infrastructure_test_value", 10).await?;
    assert_eq!(
        cache.get(key).await?,
        Some("infrastructure_test_value".to_string())
    );

    // Overwrite restarts the value under the same key.
    cache.set_ex(key, "second_value", 10).await?;
    assert_eq!(cache.get(key).await?, Some("second_value".to_string()));

    cache.delete(key).await?;
    assert_eq!(cache.get(key).await?, None);

    Ok(())
}

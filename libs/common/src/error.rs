//! Infrastructure error types shared across services
//!
//! Failures of the backing store or cache are infrastructure concerns and
//! stay distinct from any service's domain error taxonomy.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Error type for PostgreSQL operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred while establishing a connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Error occurred while applying migrations
    #[error("Database migration error: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),

    /// Invalid or missing configuration
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Error type for Redis cache operations
#[derive(Error, Debug)]
pub enum CacheError {
    /// Error occurred while opening the client or a connection
    #[error("Cache connection error: {0}")]
    Connection(#[source] redis::RedisError),

    /// Error occurred while running a cache command
    #[error("Cache command error: {0}")]
    Command(#[source] redis::RedisError),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Type alias for Result with CacheError
pub type CacheResult<T> = Result<T, CacheError>;

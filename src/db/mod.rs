//! PostgreSQL persistence via SeaORM.
//!
//! [`DbPool`] implements the repository traits from [`crate::store`]; one
//! file per collection.

mod comments;
mod files;
mod incidents;
mod users;

use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlErr};
use sea_orm_migration::MigratorTrait;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::migration::Migrator;

/// Shared database connection pool.
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Connect using the pool bounds from configuration.
    pub async fn new(config: &Config) -> AppResult<Self> {
        let mut options = ConnectOptions::new(config.database.url.clone());
        options
            .max_connections(config.database.max_connections)
            .min_connections(config.database.min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let conn = Database::connect(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to database: {}", e)))?;

        Ok(DbPool { conn })
    }

    /// Get the underlying connection.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Apply pending schema migrations.
    pub async fn run_migrations(&self) -> AppResult<()> {
        Migrator::up(&self.conn, None)
            .await
            .map_err(|e| AppError::Database(format!("Failed to run migrations: {}", e)))?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    /// Round-trip a trivial statement; used by the readiness probe.
    pub async fn ping(&self) -> AppResult<()> {
        self.conn
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| AppError::Database(format!("Database ping failed: {}", e)))?;
        Ok(())
    }
}

/// Map an insert failure, turning unique violations into `Conflict`.
fn insert_error(err: DbErr, what: &str, conflict: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(conflict.to_string()),
        _ => AppError::Database(format!("Failed to insert {}: {}", what, err)),
    }
}

/// Decode a persisted non-negative counter.
fn decode_count(value: i64, column: &str, id: uuid::Uuid) -> AppResult<u64> {
    u64::try_from(value)
        .map_err(|_| AppError::CorruptState(format!("{} {} on record {}", column, value, id)))
}

/// Encode a counter for a BIGINT column.
fn encode_count(value: u64) -> AppResult<i64> {
    i64::try_from(value).map_err(|_| AppError::Internal(format!("Count {} out of range", value)))
}

use sqlx::{postgres::PgPoolOptions, Executor, PgPool};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::DatabaseConfig;
use crate::database::memory::MemoryStore;
use crate::database::postgres::PgStore;
use crate::database::store::RecordStore;
use crate::filter::FilterError;

/// Schema for a fresh database, applied by `voz migrate`.
const INITIAL_SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

/// Errors from the record store and its helpers
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Failed to decode {table} record: {source}")]
    Decode {
        table: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Opens connection pools and record stores from configuration
pub struct DatabaseManager;

impl DatabaseManager {
    /// Create a Postgres pool for the configured URL
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = config.url.as_deref().ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Created database pool (max {} connections)", config.max_connections);
        Ok(pool)
    }

    /// Postgres store when a URL is configured, otherwise the in-memory store
    pub async fn open_store(config: &DatabaseConfig) -> Result<Arc<dyn RecordStore>, DatabaseError> {
        match config.url {
            Some(_) => {
                let pool = Self::connect(config).await?;
                Ok(Arc::new(PgStore::new(pool)))
            }
            None => {
                warn!("DATABASE_URL not set, records are kept in memory and lost on restart");
                Ok(Arc::new(MemoryStore::new()))
            }
        }
    }

    /// Apply the initial schema. Statements are idempotent.
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        pool.execute(INITIAL_SCHEMA).await?;
        info!("Database schema is up to date");
        Ok(())
    }
}

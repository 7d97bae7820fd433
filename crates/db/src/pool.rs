//! Postgres connection handling for the workflow store.

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::{DbError, PgWorkflowStore};

pub type DbPool = PgPool;

/// Pool settings for a [`PgWorkflowStore`].
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    /// Apply pending migrations right after connecting.
    pub migrate: bool,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(10),
            migrate: false,
        }
    }
}

/// Open a pool against `database_url`.
pub async fn create_pool(database_url: &str, settings: &PoolSettings) -> Result<DbPool, DbError> {
    info!(max_connections = settings.max_connections, "connecting to workflow database");
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Create the `workflows` table and its index if they are missing.
pub async fn run_migrations(pool: &DbPool) -> Result<(), DbError> {
    info!("applying workflow store migrations");
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}

/// Connect and wrap the pool in a [`PgWorkflowStore`].
pub async fn connect_store(database_url: &str, settings: &PoolSettings) -> Result<PgWorkflowStore, DbError> {
    let pool = create_pool(database_url, settings).await?;
    if settings.migrate {
        run_migrations(&pool).await?;
    }
    Ok(PgWorkflowStore::new(pool))
}

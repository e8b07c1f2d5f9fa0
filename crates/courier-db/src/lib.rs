//! # courier-db
//!
//! Persistence layer for Courier. A single SQLite database holds:
//! - **identities**: codes, password hashes, key material
//! - **message_history**: every envelope ever received, per identity
//! - **pending_messages**: the undelivered subset, drained on read
//!
//! [`MessageStore`] is the only writer of the two message tables.

pub mod locks;
pub mod repository;
pub mod store;

pub use store::MessageStore;

use anyhow::Result;
use courier_common::{crypto::IdentifierSet, error::CourierResult};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Shared database state passed through Axum extractors.
#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database named in config.
    pub async fn connect(config: &courier_common::config::AppConfig) -> Result<Self> {
        tracing::info!(url = %config.database.url, "Opening SQLite database...");
        let options = SqliteConnectOptions::from_str(&config.database.url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect_with(options)
            .await?;

        tracing::info!("Database ready");
        Ok(Self { pool })
    }

    /// A private in-memory database with migrations applied.
    ///
    /// Every SQLite `:memory:` connection is its own database, so the pool is
    /// pinned to a single connection.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Cheap liveness probe for the health endpoint.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

impl IdentifierSet for Database {
    async fn contains(&self, id: &str) -> CourierResult<bool> {
        Ok(repository::identities::exists(&self.pool, id).await?)
    }
}

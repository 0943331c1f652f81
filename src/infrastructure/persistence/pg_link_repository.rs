//! PostgreSQL implementation of the mapping store.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Connection, Executor};
use std::time::Duration;

use crate::config::{DatabaseConfig, mask_connection_string};
use crate::domain::entities::Mapping;
use crate::domain::repositories::LinkRepository;
use crate::error::StoreError;

const SQL_LOOKUP: &str = "SELECT link_url FROM links WHERE link_name = $1";
const SQL_INSERT: &str = "INSERT INTO links (link_name, link_url) VALUES ($1, $2)";
const SQL_DELETE: &str = "DELETE FROM links WHERE link_name = $1";
const SQL_LIST: &str = "SELECT link_name, link_url FROM links ORDER BY link_name";

/// PostgreSQL repository for mapping storage and retrieval.
///
/// Statements are sent as persistent prepared statements, cached per pooled
/// connection by SQLx.
pub struct PgLinkRepository {
    pool: PgPool,
}

impl PgLinkRepository {
    /// Creates a new repository over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool for the configured database and pings it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the server is unreachable or the
    /// credentials are rejected.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let url = config.connection_url();
        tracing::debug!("Connecting to {}", mask_connection_string(&url));

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout))
            .connect(&url)
            .await
            .map_err(StoreError::database("connect"))?;

        let repository = Self::new(pool);
        repository.ping().await?;
        Ok(repository)
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(StoreError::database("ping"))?;
        conn.ping().await.map_err(StoreError::database("ping"))
    }

    async fn prepare_lookup(&self) -> Result<(), StoreError> {
        (&self.pool)
            .prepare(SQL_LOOKUP)
            .await
            .map_err(StoreError::database("prepare lookup"))?;
        Ok(())
    }

    async fn find_url(&self, name: &str) -> Result<Option<String>, StoreError> {
        sqlx::query_scalar::<_, String>(SQL_LOOKUP)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::database("lookup"))
    }

    async fn insert(&self, name: &str, url: &str) -> Result<(), StoreError> {
        sqlx::query(SQL_INSERT)
            .bind(name)
            .bind(url)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                let duplicate = e
                    .as_database_error()
                    .is_some_and(|db| db.is_unique_violation());
                if duplicate {
                    StoreError::Conflict {
                        name: name.to_string(),
                    }
                } else {
                    StoreError::Database {
                        operation: "add",
                        source: e,
                    }
                }
            })?;
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(SQL_DELETE)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(StoreError::database("delete"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<Mapping>, StoreError> {
        sqlx::query_as::<_, Mapping>(SQL_LIST)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::database("list"))
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

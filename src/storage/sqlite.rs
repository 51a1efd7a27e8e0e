use async_trait::async_trait;
use chrono::Utc;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

use super::OrderStore;
use crate::config::DatabaseConfig;
use crate::error::{StorageError, StorageResult};

/// Static migrator that embeds migrations at compile time
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// SQLite-backed order storage
#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance
    pub async fn new(config: &DatabaseConfig) -> StorageResult<Self> {
        // Ensure parent directory exists
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Connection {
                message: format!("Failed to create database directory: {}", e),
            })?;
        }

        let database_url = format!("sqlite://{}?mode=rwc", config.path.display());

        let options = SqliteConnectOptions::from_str(&database_url)
            .map_err(|e| StorageError::Connection {
                message: format!("Invalid database URL: {}", e),
            })?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection {
                message: format!("Failed to connect to database: {}", e),
            })?;

        let storage = Self { pool };
        storage.run_migrations().await?;

        Ok(storage)
    }

    /// Create an in-memory storage instance, mainly for tests.
    ///
    /// A single connection keeps the in-memory database alive for the
    /// lifetime of the pool.
    pub async fn new_in_memory() -> StorageResult<Self> {
        let options =
            SqliteConnectOptions::from_str("sqlite::memory:").map_err(|e| {
                StorageError::Connection {
                    message: format!("Invalid database URL: {}", e),
                }
            })?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection {
                message: format!("Failed to open in-memory database: {}", e),
            })?;

        let storage = Self { pool };
        storage.run_migrations().await?;

        Ok(storage)
    }

    /// Run database migrations using embedded sqlx migrations
    async fn run_migrations(&self) -> StorageResult<()> {
        info!("Running database migrations...");

        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::Migration {
                message: format!("Failed to run migrations: {}", e),
            })?;

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Get the underlying pool for advanced queries
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl OrderStore for SqliteStorage {
    async fn next_order_id(&self) -> StorageResult<i64> {
        let max: Option<i64> = sqlx::query_scalar("SELECT MAX(order_id) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(max.map_or(1, |id| id + 1))
    }

    async fn insert_order_item(
        &self,
        item: &str,
        quantity: u32,
        order_id: i64,
    ) -> StorageResult<()> {
        // The menu row supplies the unit price; no matching row means the
        // item cannot be priced and the insert fails.
        let result = sqlx::query(
            r#"
            INSERT INTO orders (order_id, item_id, quantity, total_price)
            SELECT ?, item_id, ?, price * ?
            FROM food_items
            WHERE name = ?
            "#,
        )
        .bind(order_id)
        .bind(quantity)
        .bind(quantity)
        .bind(item)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::UnknownItem {
                item: item.to_string(),
            });
        }

        Ok(())
    }

    async fn insert_order_tracking(&self, order_id: i64, status: &str) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO order_tracking (order_id, status, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(order_id)
        .bind(status)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_total_order_price(&self, order_id: i64) -> StorageResult<f64> {
        let total: Option<f64> =
            sqlx::query_scalar("SELECT SUM(total_price) FROM orders WHERE order_id = ?")
                .bind(order_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(total.unwrap_or(0.0))
    }

    async fn get_order_status(&self, order_id: i64) -> StorageResult<Option<String>> {
        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM order_tracking WHERE order_id = ?")
                .bind(order_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(status)
    }
}

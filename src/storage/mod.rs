//! Storage layer for placed orders and tracking records.
//!
//! The order flow talks to persistence exclusively through the
//! [`OrderStore`] trait: order-id allocation, line-item and tracking writes,
//! and total/status reads. [`SqliteStorage`] is the SQLite-backed
//! implementation.

mod sqlite;

pub use sqlite::SqliteStorage;

use async_trait::async_trait;

use crate::error::StorageResult;

/// Persistence operations consumed by the order flow.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Next free order id: one past the highest existing id, 1 when no
    /// orders exist.
    async fn next_order_id(&self) -> StorageResult<i64>;

    /// Record one line item for an order. The line's total price is the
    /// menu unit price times `quantity`; an item missing from the menu is
    /// a failure.
    async fn insert_order_item(
        &self,
        item: &str,
        quantity: u32,
        order_id: i64,
    ) -> StorageResult<()>;

    /// Record the tracking status for an order
    async fn insert_order_tracking(&self, order_id: i64, status: &str) -> StorageResult<()>;

    /// Total price across all line items of an order
    async fn get_total_order_price(&self, order_id: i64) -> StorageResult<f64>;

    /// Tracking status for an order, if one exists
    async fn get_order_status(&self, order_id: i64) -> StorageResult<Option<String>>;
}

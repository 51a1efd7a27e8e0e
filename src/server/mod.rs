//! Server module for webhook handling.
//!
//! This module provides:
//! - Shared application state
//! - Webhook dispatch to the order operations
//! - A newline-delimited JSON server over stdio

mod handlers;
mod stdio;

pub use handlers::handle_webhook;
pub use stdio::WebhookServer;

use std::sync::Arc;

use crate::config::Config;
use crate::order::OrderFlow;
use crate::session::DraftStore;
use crate::storage::SqliteStorage;

/// Application state shared across requests.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Per-session draft orders.
    pub drafts: Arc<DraftStore>,
    /// The order state machine over SQLite persistence.
    pub order_flow: OrderFlow<SqliteStorage>,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Config, storage: SqliteStorage) -> Self {
        let drafts = Arc::new(DraftStore::new());
        let order_flow = OrderFlow::new(Arc::clone(&drafts), storage);

        Self {
            config,
            drafts,
            order_flow,
        }
    }
}

/// Shared application state handle
pub type SharedState = Arc<AppState>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_app_state_new() {
        let config = Config::from_env().unwrap();
        let storage = SqliteStorage::new_in_memory().await.unwrap();

        let state = AppState::new(config, storage);

        assert_eq!(state.drafts.session_count(), 0);
    }

    #[tokio::test]
    async fn test_shared_state_type() {
        let config = Config::from_env().unwrap();
        let storage = SqliteStorage::new_in_memory().await.unwrap();

        let state = AppState::new(config, storage);
        let shared: SharedState = Arc::new(state);

        let shared2 = Arc::clone(&shared);
        assert_eq!(Arc::strong_count(&shared), 2);
        drop(shared2);
        assert_eq!(Arc::strong_count(&shared), 1);
    }
}

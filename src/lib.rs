//! # Eatery Webhook Service
//!
//! Webhook fulfillment backend for a conversational food-ordering agent.
//! An upstream NLU provider classifies each user utterance into an intent
//! and posts a structured envelope; this service maintains a draft order per
//! conversation session, persists completed orders to SQLite, and answers
//! every request with a single human-readable fulfillment string.
//!
//! ## Operations
//!
//! - **Add**: merge validated item/quantity pairs into the session's draft
//! - **Remove**: delete items from the draft, reporting what was and wasn't
//!   there
//! - **Complete**: persist the draft as priced line items plus a tracking
//!   record, then clear the session
//! - **Track**: look up the tracking status of any placed order
//!
//! ## Architecture
//!
//! ```text
//! NLU provider → webhook envelope → intent dispatch → order flow
//!                                                         ↓
//!                                              drafts (memory) + SQLite
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use eatery_webhook::{AppState, Config, WebhookServer};
//! use eatery_webhook::storage::SqliteStorage;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let storage = SqliteStorage::new(&config.database).await?;
//!     let state = Arc::new(AppState::new(config, storage));
//!     let server = WebhookServer::new(state);
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Configuration management for the webhook service.
pub mod config;
/// Error types and result aliases for the application.
pub mod error;
/// The session order state machine.
pub mod order;
/// Webhook server, dispatch, and shared state.
pub mod server;
/// In-memory per-session draft orders.
pub mod session;
/// Storage layer for placed orders.
pub mod storage;
/// Webhook envelope types and the intent registry.
pub mod webhook;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use server::{AppState, SharedState, WebhookServer};

//! Session-scoped draft orders.
//!
//! A draft is the not-yet-persisted item-to-quantity mapping a conversation
//! builds up before completing. Drafts live only in process memory; the
//! [`DraftStore`] keys them by the provider session id and serializes all
//! operations touching the same session.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// An in-progress order: insertion-ordered mapping of item name to quantity.
///
/// Item names are kept exactly as received. Every stored quantity is at
/// least 1; callers validate before merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    items: IndexMap<String, u32>,
}

impl OrderDraft {
    /// Create an empty draft
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` of `item`, accumulating with any existing entry
    pub fn merge(&mut self, item: &str, quantity: u32) {
        *self.items.entry(item.to_string()).or_insert(0) += quantity;
    }

    /// Remove an item, preserving the order of the remaining entries.
    /// Returns true when the item was present.
    pub fn remove(&mut self, item: &str) -> bool {
        self.items.shift_remove(item).is_some()
    }

    /// Quantity currently drafted for an item, if any
    pub fn quantity(&self, item: &str) -> Option<u32> {
        self.items.get(item).copied()
    }

    /// Whether the draft holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct items in the draft
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Iterate entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.items.iter().map(|(item, qty)| (item.as_str(), *qty))
    }

    /// Render the draft as `"<qty> <item>"` pairs joined by `", "`,
    /// in insertion order.
    pub fn render(&self) -> String {
        self.items
            .iter()
            .map(|(item, qty)| format!("{qty} {item}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

type Slot = Arc<AsyncMutex<Option<OrderDraft>>>;

/// Process-wide store of per-session draft orders.
///
/// Each session id owns one slot guarded by its own async lock. An order
/// operation holds the lock for its full duration (including any storage
/// calls), so operations for the same session serialize while distinct
/// sessions proceed independently. Slots are never expired; a cleared draft
/// keeps its (empty) slot for the life of the process.
#[derive(Debug, Default)]
pub struct DraftStore {
    slots: Mutex<HashMap<String, Slot>>,
}

impl DraftStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the draft slot for a session, creating the slot on first use.
    ///
    /// The returned guard dereferences to `Option<OrderDraft>`: `None` means
    /// the session has no draft. Taking the draft out of the slot clears it.
    pub async fn lock(&self, session_id: &str) -> OwnedMutexGuard<Option<OrderDraft>> {
        let slot = {
            let mut slots = self.slots.lock();
            slots.entry(session_id.to_string()).or_default().clone()
        };
        slot.lock_owned().await
    }

    /// Number of sessions that have touched the store
    pub fn session_count(&self) -> usize {
        self.slots.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_merge_accumulates_quantities() {
        let mut draft = OrderDraft::new();
        draft.merge("pizza", 2);
        draft.merge("biryani", 1);
        draft.merge("pizza", 1);

        assert_eq!(draft.quantity("pizza"), Some(3));
        assert_eq!(draft.quantity("biryani"), Some(1));
        assert_eq!(draft.len(), 2);
    }

    #[test]
    fn test_render_preserves_insertion_order() {
        let mut draft = OrderDraft::new();
        draft.merge("pizza", 2);
        draft.merge("biryani", 1);
        draft.merge("samosa", 4);

        assert_eq!(draft.render(), "2 pizza, 1 biryani, 4 samosa");

        // Re-merging an existing item must not move it to the back.
        draft.merge("pizza", 1);
        assert_eq!(draft.render(), "3 pizza, 1 biryani, 4 samosa");
    }

    #[test]
    fn test_remove_keeps_remaining_order() {
        let mut draft = OrderDraft::new();
        draft.merge("pizza", 2);
        draft.merge("biryani", 1);
        draft.merge("samosa", 4);

        assert!(draft.remove("biryani"));
        assert!(!draft.remove("biryani"));
        assert_eq!(draft.render(), "2 pizza, 4 samosa");
    }

    #[test]
    fn test_item_names_are_case_sensitive() {
        let mut draft = OrderDraft::new();
        draft.merge("Pizza", 1);
        draft.merge("pizza", 2);

        assert_eq!(draft.quantity("Pizza"), Some(1));
        assert_eq!(draft.quantity("pizza"), Some(2));
    }

    #[tokio::test]
    async fn test_store_starts_empty_per_session() {
        let store = DraftStore::new();
        let guard = store.lock("sess-1").await;
        assert!(guard.is_none());
        assert_eq!(store.session_count(), 1);
    }

    #[tokio::test]
    async fn test_store_persists_draft_between_locks() {
        let store = DraftStore::new();

        {
            let mut guard = store.lock("sess-1").await;
            let draft = guard.get_or_insert_with(OrderDraft::new);
            draft.merge("pizza", 2);
        }

        let guard = store.lock("sess-1").await;
        assert_eq!(guard.as_ref().unwrap().quantity("pizza"), Some(2));
    }

    #[tokio::test]
    async fn test_same_session_operations_serialize() {
        let store = Arc::new(DraftStore::new());
        let held = store.lock("sess-1").await;

        let contender = {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let _guard = store.lock("sess-1").await;
            })
        };

        // The second lock cannot proceed while the first guard is held.
        let raced = tokio::time::timeout(Duration::from_millis(50), contender).await;
        assert!(raced.is_err());

        drop(held);
    }

    #[tokio::test]
    async fn test_distinct_sessions_do_not_contend() {
        let store = DraftStore::new();
        let _a = store.lock("sess-a").await;

        let b = tokio::time::timeout(Duration::from_millis(50), store.lock("sess-b")).await;
        assert!(b.is_ok());
        assert_eq!(store.session_count(), 2);
    }
}

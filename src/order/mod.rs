//! The session order state machine.
//!
//! [`OrderFlow`] interprets the four conversational operations against a
//! session's draft: add and remove mutate the draft in memory, complete
//! persists it as a placed order, track reads back a placed order's status.
//! Every operation resolves to a single fulfillment string; expected failure
//! modes answer with a corrective message rather than an error.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, error, info, warn};

use crate::error::{AppResult, StorageResult};
use crate::session::{DraftStore, OrderDraft};
use crate::storage::OrderStore;
use crate::webhook::{AddParams, RemoveParams, TrackParams};

/// Status written for a freshly placed order; fulfillment systems move it
/// along afterwards.
const TRACKING_STATUS_PLACED: &str = "in progress";

const MSG_NO_ORDER: &str =
    "I'm having a trouble finding your order. Sorry! Can you place a new order please?";
const MSG_SPECIFY_ITEMS: &str = "Please specify which food items you'd like to order.";
const MSG_SPECIFY_QUANTITIES: &str = "Please specify the quantities for your food items.";
const MSG_ITEM_QUANTITY_MISMATCH: &str =
    "Sorry, the number of food items and quantities don't match. Please specify both items and their quantities clearly.";
const MSG_INVALID_QUANTITIES: &str =
    "Please provide valid quantities (positive numbers) for your food items.";
const MSG_BACKEND_ERROR: &str =
    "Sorry, I couldn't process your order due to a backend error. Please place a new order again";
const MSG_INVALID_ORDER_ID: &str = "Please provide a valid order ID to track your order.";
const MSG_ORDER_ID_NOT_A_NUMBER: &str = "Please provide a valid order ID number.";

/// The order state machine, bound to a draft store and a persistence
/// backend.
pub struct OrderFlow<S> {
    drafts: Arc<DraftStore>,
    storage: S,
}

impl<S: OrderStore> OrderFlow<S> {
    /// Create a new order flow
    pub fn new(drafts: Arc<DraftStore>, storage: S) -> Self {
        Self { drafts, storage }
    }

    /// Add items to the session's draft order.
    ///
    /// Validation short-circuits in a fixed order and is all-or-nothing: a
    /// single bad quantity aborts the whole request before any mutation.
    pub async fn add_to_order(&self, session_id: &str, params: AddParams) -> AppResult<String> {
        debug!(
            session_id = %session_id,
            items = params.food_items.len(),
            quantities = params.quantities.len(),
            "Adding items to order"
        );

        if params.food_items.is_empty() {
            warn!(session_id = %session_id, "No food items specified");
            return Ok(MSG_SPECIFY_ITEMS.to_string());
        }

        if params.quantities.is_empty() {
            warn!(session_id = %session_id, "No quantities specified");
            return Ok(MSG_SPECIFY_QUANTITIES.to_string());
        }

        if params.food_items.len() != params.quantities.len() {
            warn!(
                session_id = %session_id,
                items = params.food_items.len(),
                quantities = params.quantities.len(),
                "Mismatch between food items and quantities"
            );
            return Ok(MSG_ITEM_QUANTITY_MISMATCH.to_string());
        }

        let mut validated = Vec::with_capacity(params.quantities.len());
        for quantity in &params.quantities {
            match quantity.as_quantity() {
                Some(q) => validated.push(q),
                None => {
                    warn!(session_id = %session_id, ?quantity, "Invalid quantity value");
                    return Ok(MSG_INVALID_QUANTITIES.to_string());
                }
            }
        }

        // Pair positionally; a repeated item name keeps its first position
        // but the later quantity wins, so the pair contributes once.
        let mut incoming: IndexMap<&str, u32> = IndexMap::new();
        for (item, quantity) in params.food_items.iter().zip(validated) {
            incoming.insert(item.as_str(), quantity);
        }

        let mut guard = self.drafts.lock(session_id).await;
        let draft = guard.get_or_insert_with(OrderDraft::new);
        for (item, quantity) in &incoming {
            draft.merge(item, *quantity);
        }

        let order_str = draft.render();
        info!(session_id = %session_id, draft = %order_str, "Draft updated");

        Ok(format!(
            "Great! I've added that to your order. So far you have: {order_str}. Would you like to add anything else?"
        ))
    }

    /// Remove items from the session's draft order.
    ///
    /// Items are processed independently: present ones are deleted, absent
    /// ones are reported back, and the response always ends with the state
    /// of the remaining draft.
    pub async fn remove_from_order(
        &self,
        session_id: &str,
        params: RemoveParams,
    ) -> AppResult<String> {
        debug!(
            session_id = %session_id,
            items = params.food_items.len(),
            "Removing items from order"
        );

        let mut guard = self.drafts.lock(session_id).await;
        let Some(draft) = guard.as_mut() else {
            warn!(session_id = %session_id, "No in-progress order for session");
            return Ok(MSG_NO_ORDER.to_string());
        };

        let mut removed = Vec::new();
        let mut missing = Vec::new();
        for item in &params.food_items {
            if draft.remove(item) {
                removed.push(item.as_str());
            } else {
                missing.push(item.as_str());
            }
        }

        let mut fulfillment = String::new();
        if !removed.is_empty() {
            fulfillment.push_str(&format!("Removed {} from your order!", removed.join(", ")));
        }
        if !missing.is_empty() {
            fulfillment.push_str(&format!(
                " Your current order does not have {}.",
                missing.join(", ")
            ));
        }
        if draft.is_empty() {
            fulfillment.push_str(" Your order is empty!");
        } else {
            fulfillment.push_str(&format!(
                " Here is what is left in your order: {}",
                draft.render()
            ));
        }

        info!(
            session_id = %session_id,
            removed = removed.len(),
            missing = missing.len(),
            "Removal processed"
        );

        Ok(fulfillment)
    }

    /// Persist the session's draft as a placed order.
    ///
    /// The draft leaves the store before persistence starts and never comes
    /// back: completion clears the session on every exit path. Line items
    /// are inserted one by one, aborting on the first failure; a tracking
    /// record is written only after every line item succeeded.
    pub async fn complete_order(&self, session_id: &str) -> AppResult<String> {
        info!(session_id = %session_id, "Completing order for session");

        let mut guard = self.drafts.lock(session_id).await;
        let Some(order) = guard.take().filter(|draft| !draft.is_empty()) else {
            warn!(session_id = %session_id, "No in-progress order for session");
            return Ok(MSG_NO_ORDER.to_string());
        };

        let order_id = match self.save_order(&order).await {
            Ok(id) => id,
            Err(e) => {
                error!(session_id = %session_id, error = %e, "Failed to save order");
                return Ok(MSG_BACKEND_ERROR.to_string());
            }
        };

        let total = match self.storage.get_total_order_price(order_id).await {
            Ok(total) => total,
            Err(e) => {
                error!(order_id, error = %e, "Failed to compute order total");
                return Ok(MSG_BACKEND_ERROR.to_string());
            }
        };

        info!(session_id = %session_id, order_id, total, "Order placed");

        Ok(format!(
            "Awesome. We have placed your order. Here is your order id # {order_id}. Your order total is ${total:.2} which you can pay at the time of delivery!"
        ))
    }

    /// Look up the tracking status of a placed order.
    ///
    /// Tracking is global: the session id plays no part in the lookup.
    pub async fn track_order(&self, params: TrackParams) -> AppResult<String> {
        let order_id = match params.order_id {
            None => 0,
            Some(value) => match value.as_order_id() {
                Some(id) => id,
                None => {
                    warn!(?value, "Order id is not an integer");
                    return Ok(MSG_ORDER_ID_NOT_A_NUMBER.to_string());
                }
            },
        };

        if order_id <= 0 {
            warn!(order_id, "Invalid order id");
            return Ok(MSG_INVALID_ORDER_ID.to_string());
        }

        info!(order_id, "Tracking order");

        match self.storage.get_order_status(order_id).await? {
            Some(status) => {
                info!(order_id, status = %status, "Order status found");
                Ok(format!(
                    "The order status for order id: {order_id} is: {status}"
                ))
            }
            None => {
                warn!(order_id, "No order found");
                Ok(format!("No order found with order id: {order_id}"))
            }
        }
    }

    /// Allocate an order id, insert every line item, then the tracking
    /// record. Already-inserted lines are left in place when a later step
    /// fails; the caller reports the backend error to the user.
    async fn save_order(&self, order: &OrderDraft) -> StorageResult<i64> {
        let order_id = self.storage.next_order_id().await?;
        info!(order_id, items = order.len(), "Saving order");

        for (item, quantity) in order.iter() {
            self.storage
                .insert_order_item(item, quantity, order_id)
                .await?;
        }

        self.storage
            .insert_order_tracking(order_id, TRACKING_STATUS_PLACED)
            .await?;

        Ok(order_id)
    }
}

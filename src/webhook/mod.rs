//! Webhook envelope types for the NLU provider boundary.
//!
//! This module models the slice of the provider's webhook request the
//! service consumes (intent display name, flat parameter map, output
//! contexts) and the single-field fulfillment response it produces. It also
//! owns session-id extraction and the fixed intent registry.

mod params;

pub use params::{AddParams, ParamValue, RemoveParams, TrackParams};

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EnvelopeError, EnvelopeResult};

/// Inbound webhook request envelope.
///
/// Fields the service does not consume are ignored; missing blocks decode to
/// their defaults so malformed envelopes surface as fulfillment messages
/// rather than transport errors.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookRequest {
    /// The query result block carrying intent, parameters, and contexts.
    #[serde(rename = "queryResult", default)]
    pub query_result: QueryResult,
}

/// The decoded query result of a webhook request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResult {
    /// Intent identification as supplied by the provider.
    #[serde(default)]
    pub intent: IntentInfo,
    /// Flat mapping of named parameters.
    #[serde(default)]
    pub parameters: serde_json::Map<String, Value>,
    /// Output contexts; the first entry's name encodes the session id.
    #[serde(rename = "outputContexts", default)]
    pub output_contexts: Vec<OutputContext>,
}

/// Intent identification block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntentInfo {
    /// Human-readable intent display name used for dispatch.
    #[serde(rename = "displayName", default)]
    pub display_name: String,
}

/// A single output context.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputContext {
    /// Path-like context name (`.../sessions/{session_id}/contexts`).
    pub name: String,
    /// Remaining conversational turns this context lives for.
    #[serde(rename = "lifespanCount", default)]
    pub lifespan_count: Option<u32>,
}

/// Outbound webhook response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookResponse {
    /// The single human-readable fulfillment string.
    #[serde(rename = "fulfillmentText")]
    pub fulfillment_text: String,
}

impl WebhookResponse {
    /// Create a response carrying the given fulfillment text
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            fulfillment_text: text.into(),
        }
    }
}

impl WebhookRequest {
    /// Extract the session id from the first output context, failing closed
    pub fn session_id(&self) -> EnvelopeResult<&str> {
        let context = self
            .query_result
            .output_contexts
            .first()
            .ok_or(EnvelopeError::MissingContexts)?;

        extract_session_id(&context.name).ok_or_else(|| EnvelopeError::SessionId {
            context: context.name.clone(),
        })
    }
}

/// Extract the session id from a provider context name.
///
/// The session id is the second-to-last `/`-delimited segment of the name.
/// Names with fewer than two segments, or an empty id segment, yield `None`.
pub fn extract_session_id(context_name: &str) -> Option<&str> {
    let mut segments = context_name.rsplit('/');
    segments.next()?;
    let session_id = segments.next()?;
    if session_id.is_empty() {
        None
    } else {
        Some(session_id)
    }
}

/// Supported conversational intents.
///
/// Dispatch is an exhaustive match over this enum; display names outside the
/// registry never reach the order flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Add items to the session's draft order.
    AddToOrder,
    /// Remove items from the session's draft order.
    RemoveFromOrder,
    /// Persist the draft as a placed order.
    CompleteOrder,
    /// Look up the tracking status of a placed order.
    TrackOrder,
}

impl Intent {
    /// Match a provider display name against the fixed registry
    pub fn from_display_name(name: &str) -> Option<Self> {
        match name {
            "order.add - context: ongoing-order" => Some(Intent::AddToOrder),
            "order.remove - context: ongoing-order" => Some(Intent::RemoveFromOrder),
            "order.complete - context: ongoing-order" => Some(Intent::CompleteOrder),
            "track.order - context: ongoing-tracking" => Some(Intent::TrackOrder),
            _ => None,
        }
    }

    /// Short name used in logs and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::AddToOrder => "order.add",
            Intent::RemoveFromOrder => "order.remove",
            Intent::CompleteOrder => "order.complete",
            Intent::TrackOrder => "track.order",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_session_id_from_provider_path() {
        let name = "projects/eatery/agent/sessions/abc-123/contexts";
        assert_eq!(extract_session_id(name), Some("abc-123"));
    }

    #[test]
    fn test_extract_session_id_two_segments() {
        assert_eq!(extract_session_id("abc-123/contexts"), Some("abc-123"));
    }

    #[test]
    fn test_extract_session_id_fails_closed() {
        assert_eq!(extract_session_id("no-slashes"), None);
        assert_eq!(extract_session_id(""), None);
        assert_eq!(extract_session_id("/contexts"), None);
    }

    #[test]
    fn test_intent_registry_exact_match() {
        assert_eq!(
            Intent::from_display_name("order.add - context: ongoing-order"),
            Some(Intent::AddToOrder)
        );
        assert_eq!(
            Intent::from_display_name("order.remove - context: ongoing-order"),
            Some(Intent::RemoveFromOrder)
        );
        assert_eq!(
            Intent::from_display_name("order.complete - context: ongoing-order"),
            Some(Intent::CompleteOrder)
        );
        assert_eq!(
            Intent::from_display_name("track.order - context: ongoing-tracking"),
            Some(Intent::TrackOrder)
        );
    }

    #[test]
    fn test_intent_registry_rejects_near_misses() {
        assert_eq!(Intent::from_display_name("order.add"), None);
        assert_eq!(
            Intent::from_display_name("ORDER.ADD - CONTEXT: ONGOING-ORDER"),
            None
        );
        assert_eq!(Intent::from_display_name(""), None);
    }

    #[test]
    fn test_webhook_request_session_id() {
        let request: WebhookRequest = serde_json::from_value(json!({
            "queryResult": {
                "intent": { "displayName": "order.add - context: ongoing-order" },
                "parameters": {},
                "outputContexts": [
                    { "name": "projects/p/agent/sessions/sess-9/contexts" }
                ]
            }
        }))
        .unwrap();

        assert_eq!(request.session_id().unwrap(), "sess-9");
    }

    #[test]
    fn test_webhook_request_missing_contexts() {
        let request: WebhookRequest = serde_json::from_value(json!({
            "queryResult": { "outputContexts": [] }
        }))
        .unwrap();

        assert!(matches!(
            request.session_id(),
            Err(crate::error::EnvelopeError::MissingContexts)
        ));
    }

    #[test]
    fn test_webhook_request_tolerates_missing_blocks() {
        let request: WebhookRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.query_result.intent.display_name.is_empty());
        assert!(request.query_result.output_contexts.is_empty());
    }

    #[test]
    fn test_response_serializes_fulfillment_text() {
        let response = WebhookResponse::text("hello");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, json!({ "fulfillmentText": "hello" }));
    }
}

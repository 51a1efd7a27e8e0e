use tracing::{error, info, warn};

use super::SharedState;
use crate::error::AppResult;
use crate::webhook::{
    AddParams, Intent, RemoveParams, TrackParams, WebhookRequest, WebhookResponse,
};

pub(crate) const MSG_CANNOT_PROCESS: &str =
    "I'm sorry, but I couldn't process your request. Please try again.";
const MSG_NO_SESSION: &str = "I'm sorry, but I couldn't identify your session. Please try again.";
const MSG_UNSUPPORTED_INTENT: &str =
    "I'm sorry, I don't know how to process that request. Can you try something else?";
const MSG_SOMETHING_WENT_WRONG: &str =
    "I'm sorry, but something went wrong. Please try again later.";

/// Route a decoded webhook request to the matching order operation.
///
/// Every path resolves to a fulfillment response: missing contexts, an
/// unextractable session id, and unregistered intents each answer with their
/// fixed message, and an error escaping a handler is logged and converted to
/// a generic apology. Nothing propagates to the transport.
pub async fn handle_webhook(state: &SharedState, request: WebhookRequest) -> WebhookResponse {
    let display_name = request.query_result.intent.display_name.clone();
    info!(intent = %display_name, "Received webhook request");

    if request.query_result.output_contexts.is_empty() {
        error!("No output contexts found in the request");
        return WebhookResponse::text(MSG_CANNOT_PROCESS);
    }

    let session_id = match request.session_id() {
        Ok(id) => id.to_string(),
        Err(e) => {
            error!(error = %e, "Failed to extract session id from context");
            return WebhookResponse::text(MSG_NO_SESSION);
        }
    };

    let Some(intent) = Intent::from_display_name(&display_name) else {
        warn!(intent = %display_name, "Unsupported intent");
        return WebhookResponse::text(MSG_UNSUPPORTED_INTENT);
    };

    info!(intent = %intent, session_id = %session_id, "Routing to handler");

    match dispatch(state, intent, &session_id, &request).await {
        Ok(text) => WebhookResponse::text(text),
        Err(e) => {
            error!(
                intent = %intent,
                session_id = %session_id,
                error = %e,
                "Handler failed"
            );
            WebhookResponse::text(MSG_SOMETHING_WENT_WRONG)
        }
    }
}

/// Exhaustive dispatch over the intent registry
async fn dispatch(
    state: &SharedState,
    intent: Intent,
    session_id: &str,
    request: &WebhookRequest,
) -> AppResult<String> {
    let parameters = &request.query_result.parameters;

    match intent {
        Intent::AddToOrder => {
            let params = AddParams::from_parameters(parameters)?;
            state.order_flow.add_to_order(session_id, params).await
        }
        Intent::RemoveFromOrder => {
            let params = RemoveParams::from_parameters(parameters)?;
            state.order_flow.remove_from_order(session_id, params).await
        }
        Intent::CompleteOrder => state.order_flow.complete_order(session_id).await,
        Intent::TrackOrder => {
            let params = TrackParams::from_parameters(parameters)?;
            state.order_flow.track_order(params).await
        }
    }
}

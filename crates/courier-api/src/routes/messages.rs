//! Message routes: submit, drain, history.
//!
//! POST /send-message     queue a sealed message for another identity
//! GET  /fetch-messages   drain the caller's pending queue
//! GET  /message-history  everything the caller ever received

use axum::{
    extract::{Extension, State},
    middleware,
    routing::{get, post},
    Router,
};
use courier_common::{
    error::CourierResult,
    models::envelope::{MessagesResponse, SendMessageRequest, SendMessageResponse},
};
use std::sync::Arc;

use crate::{extract::Json, middleware::AuthContext, AppState};

pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/send-message", post(send_message))
        .route("/fetch-messages", get(fetch_messages))
        .route("/message-history", get(message_history))
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::middleware::auth_middleware,
        ))
}

/// POST /send-message
async fn send_message(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<SendMessageRequest>,
) -> CourierResult<Json<SendMessageResponse>> {
    let envelope = state.delivery.submit(&auth.identity_id, &body).await?;

    tracing::info!(
        from = %envelope.from,
        to = %body.to,
        timestamp = envelope.timestamp,
        "Message queued"
    );

    Ok(Json(SendMessageResponse {
        message: "sent".into(),
    }))
}

/// GET /fetch-messages
///
/// Draining read: a second call returns only what arrived in between.
async fn fetch_messages(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> CourierResult<Json<MessagesResponse>> {
    let messages = state.delivery.fetch_pending(&auth.identity_id).await?;
    if !messages.is_empty() {
        tracing::info!(code = %auth.identity_id, count = messages.len(), "Delivered pending messages");
    }
    Ok(Json(MessagesResponse { messages }))
}

/// GET /message-history
async fn message_history(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> CourierResult<Json<MessagesResponse>> {
    let messages = state.delivery.fetch_history(&auth.identity_id).await?;
    Ok(Json(MessagesResponse { messages }))
}

//! Public-key lookup: the one unauthenticated delivery operation.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use courier_common::{error::CourierResult, models::identity::PublicKeyResponse};
use std::sync::Arc;

use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/public-key/{id}", get(public_key))
}

/// GET /public-key/{id}
async fn public_key(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> CourierResult<Json<PublicKeyResponse>> {
    let public_key = state.delivery.lookup_public_key(&id).await?;
    Ok(Json(PublicKeyResponse { public_key }))
}

//! # courier-api
//!
//! HTTP surface of the Courier delivery service: registration and login,
//! public-key lookup, message submission, and the drain/history reads that
//! clients poll.

pub mod auth;
pub mod delivery;
pub mod extract;
pub mod middleware;
pub mod routes;

use axum::Router;
use courier_common::{config::AppConfig, config::AuthConfig, crypto::KeyIssuer, error::CourierResult};
use courier_db::Database;
use delivery::DeliveryService;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    /// Queue/history operations; owns the per-identity lock arena.
    pub delivery: DeliveryService,
    /// Key pair and code generation for new identities.
    pub issuer: KeyIssuer,
    pub auth: AuthConfig,
    pub started_at: Instant,
}

impl AppState {
    pub fn from_config(db: Database, config: &AppConfig) -> CourierResult<Self> {
        Ok(Self {
            delivery: DeliveryService::new(&db, &config.limits),
            issuer: KeyIssuer::new(config.crypto.rsa_bits)?,
            auth: config.auth.clone(),
            started_at: Instant::now(),
            db,
        })
    }
}

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .merge(routes::auth::router(state.clone()))
        .merge(routes::keys::router())
        .merge(routes::messages::router(state.clone()))
        .merge(routes::health::router())
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

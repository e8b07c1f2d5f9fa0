//! Middleware: bearer-token authentication.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use courier_common::{auth::ACCESS_TOKEN, error::CourierError};
use std::sync::Arc;

use crate::AppState;

/// Authentication context extracted from the Authorization header.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Code of the identity the token was issued to.
    pub identity_id: String,
}

/// Extract and validate the JWT from the `Authorization: Bearer <token>` header.
///
/// A missing or malformed header is 401; a token that fails validation is 403.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, CourierError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .ok_or(CourierError::Unauthorized)?;

    let claims = courier_common::auth::validate_token(token, &state.auth.jwt_secret).map_err(|e| {
        tracing::debug!(error = %e, "Rejected session token");
        CourierError::InvalidToken
    })?;

    if claims.token_type != ACCESS_TOKEN {
        return Err(CourierError::InvalidToken);
    }

    request.extensions_mut().insert(AuthContext {
        identity_id: claims.sub,
    });

    Ok(next.run(request).await)
}

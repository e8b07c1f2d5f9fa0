//! Account routes: register, login, and a token check.
//!
//! Registration is where identities get their key pair and code. Everything
//! here is the credential-handling collaborator of the delivery core.

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Router,
};
use courier_common::{
    error::{CourierError, CourierResult},
    models::identity::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserProfile},
    time::now_millis,
    validation::validate_request,
};
use courier_db::repository::identities::{self, NewIdentity};
use serde::Serialize;
use std::sync::Arc;

use crate::{auth, extract::Json, AppState};

/// Account router.
pub fn router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let protected = Router::new()
        .route("/dashboard", get(dashboard))
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::middleware::auth_middleware,
        ));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .merge(protected)
}

#[derive(Serialize)]
struct MessageBody {
    message: String,
}

/// POST /register
///
/// Create an identity: issue its key pair and code, store the password hash.
/// The private key is returned here; unless the server is configured to
/// retain keys, this is the only time it ever leaves the server.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> CourierResult<(StatusCode, Json<RegisterResponse>)> {
    validate_request(&body)?;

    if identities::find_by_email(&state.db.pool, &body.email)
        .await?
        .is_some()
    {
        return Err(CourierError::AlreadyExists {
            resource: "Email".into(),
        });
    }
    if identities::find_by_phone(&state.db.pool, &body.phone)
        .await?
        .is_some()
    {
        return Err(CourierError::AlreadyExists {
            resource: "Phone".into(),
        });
    }

    let password_hash = auth::hash_password(&body.password)
        .map_err(|e| CourierError::Internal(anyhow::anyhow!("{e}")))?;

    let issued = state.issuer.issue(&state.db).await?;
    let retained = state
        .auth
        .retain_private_keys
        .then_some(issued.private_key_pem.as_str());

    let identity = identities::insert_unique(
        &state.db.pool,
        &state.db,
        NewIdentity {
            id: &issued.id,
            email: &body.email,
            phone: &body.phone,
            password_hash: &password_hash,
            public_key: &issued.public_key_pem,
            private_key: retained,
            created_at: now_millis(),
        },
    )
    .await?;

    tracing::info!(code = %identity.id, retained = retained.is_some(), "New identity registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully.".into(),
            code: identity.id,
            public_key: identity.public_key,
            private_key: issued.private_key_pem,
        }),
    ))
}

/// POST /login
///
/// Authenticate with identity code + password. Returns a session token.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> CourierResult<Json<LoginResponse>> {
    validate_request(&body)?;

    let identity = identities::find_by_id(&state.db.pool, &body.code)
        .await?
        .ok_or(CourierError::InvalidCredentials)?;

    let valid = auth::verify_password(&body.password, &identity.password_hash)
        .map_err(|_| CourierError::InvalidCredentials)?;
    if !valid {
        return Err(CourierError::InvalidCredentials);
    }

    let token = auth::generate_access_token(
        &identity.id,
        &identity.email,
        &state.auth.jwt_secret,
        state.auth.access_token_ttl_secs,
    )
    .map_err(|e| CourierError::Internal(e.into()))?;

    tracing::info!(code = %identity.id, "Identity logged in");

    Ok(Json(LoginResponse {
        message: "Login successful.".into(),
        token,
        user: UserProfile::from(identity),
    }))
}

/// GET /dashboard
async fn dashboard() -> Json<MessageBody> {
    Json(MessageBody {
        message: "Welcome! This is your dashboard.".into(),
    })
}

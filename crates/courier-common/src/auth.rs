//! Shared JWT session-token utilities.
//!
//! Claims and token validation live here so the API middleware and any
//! out-of-process tooling agree on the token shape. Token issuance and
//! password hashing stay in courier-api.

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Token type carried by every session token the server hands out.
pub const ACCESS_TOKEN: &str = "access";

/// JWT claims embedded in session tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (identity code)
    pub sub: String,
    /// Email the identity registered with
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// Token type, always [`ACCESS_TOKEN`] today
    pub token_type: String,
}

/// Validate and decode a JWT token.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

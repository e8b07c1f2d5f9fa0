//! Identity model: one registered party and its key material.

use std::fmt;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A registered identity as persisted by the server.
#[derive(Clone, sqlx::FromRow)]
pub struct Identity {
    /// Short unique code (8 lowercase hex characters)
    pub id: String,
    pub email: String,
    pub phone: String,
    /// Argon2id password hash
    pub password_hash: String,
    /// SPKI PEM
    pub public_key: String,
    /// PKCS#8 PEM; `None` once the server has stopped retaining it
    pub private_key: Option<String>,
    /// Milliseconds since epoch
    pub created_at: i64,
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("public_key", &self.public_key)
            .field("private_key_retained", &self.private_key.is_some())
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Registration request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 3, max = 32, message = "Phone must be 3-32 characters"))]
    pub phone: String,

    #[serde(default)]
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
}

/// Registration response. The private key is only ever sent here and, when the
/// server retains keys, on login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub code: String,
    pub public_key: String,
    pub private_key: String,
}

/// Login request: identity code plus password.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Code is required"))]
    pub code: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Profile returned alongside a session token.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub email: String,
    pub phone: String,
    pub code: String,
    pub public_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

impl fmt::Debug for UserProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserProfile")
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("code", &self.code)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

impl From<Identity> for UserProfile {
    fn from(identity: Identity) -> Self {
        Self {
            email: identity.email,
            phone: identity.phone,
            code: identity.id,
            public_key: identity.public_key,
            private_key: identity.private_key,
        }
    }
}

/// Login response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: UserProfile,
}

/// `GET /public-key/{id}` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyResponse {
    pub public_key: String,
}

//! Envelope model: one encrypted message unit as stored and delivered.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// An encrypted message addressed to one identity.
///
/// The server never sees anything but ciphertext: `encrypted_message` is
/// base64(IV ‖ AES-CBC output) and `encrypted_aes_key` is the RSA-OAEP
/// wrapped one-time key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Sender identity code, taken from the sender's session token
    pub from: String,
    pub encrypted_message: String,
    #[serde(rename = "encryptedAESKey")]
    pub encrypted_aes_key: String,
    /// Server-assigned at append time, milliseconds since epoch
    pub timestamp: i64,
}

/// `POST /send-message` body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Recipient is required"))]
    pub to: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "encryptedMessage is required"))]
    pub encrypted_message: String,

    #[serde(default, rename = "encryptedAESKey")]
    #[validate(length(min = 1, message = "encryptedAESKey is required"))]
    pub encrypted_aes_key: String,
}

/// `POST /send-message` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub message: String,
}

/// `GET /fetch-messages` and `GET /message-history` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub messages: Vec<Envelope>,
}

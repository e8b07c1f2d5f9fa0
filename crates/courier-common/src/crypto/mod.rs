//! End-to-end crypto core.
//!
//! The server never encrypts or decrypts message bodies. This module is the
//! single implementation of the hybrid envelope (used by clients) and of key
//! issuance (used by the server at registration):
//!
//! - [`envelope`]: AES-256-CBC body under a one-time key, key wrapped with
//!   RSA-OAEP (SHA-1) for the recipient.
//! - [`issuer`]: RSA key pair plus a short unique identity code.
//!
//! Keys travel as PEM text: SPKI for public keys, PKCS#8 for private keys.

pub mod envelope;
pub mod issuer;

pub use envelope::{open, seal, SealedMessage};
pub use issuer::{allocate_code, IdentifierSet, IssuedIdentity, KeyIssuer, MAX_CODE_ATTEMPTS};

use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};

/// Smallest RSA modulus the issuer will produce.
pub const MIN_RSA_BITS: usize = 2048;

/// Errors raised by the crypto core.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// Randomness or the RSA primitive failed while issuing keys. Fatal.
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// PEM text could not be parsed into a key.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("encryption failed")]
    Encryption,

    /// Wrong key, corrupted or truncated input, or bad padding. Carries no detail.
    #[error("message could not be decrypted")]
    Decryption,
}

/// Parse an SPKI PEM public key.
pub fn public_key_from_pem(pem: &str) -> Result<RsaPublicKey, CryptoError> {
    RsaPublicKey::from_public_key_pem(pem).map_err(|e| CryptoError::InvalidKey(e.to_string()))
}

/// Parse a PKCS#8 PEM private key.
pub fn private_key_from_pem(pem: &str) -> Result<RsaPrivateKey, CryptoError> {
    RsaPrivateKey::from_pkcs8_pem(pem).map_err(|e| CryptoError::InvalidKey(e.to_string()))
}

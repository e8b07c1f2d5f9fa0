//! Key issuance for new identities.
//!
//! An identity is an RSA key pair plus a short code that other users type
//! or scan to address messages. Codes are 4 random bytes rendered as hex and
//! are checked against the live identifier set rather than assumed unique.

use std::future::Future;

use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::RsaPrivateKey;

use super::{CryptoError, MIN_RSA_BITS};
use crate::error::{CourierError, CourierResult};

/// Random bytes per identity code (8 hex characters).
pub const CODE_BYTES: usize = 4;

/// Consecutive collisions tolerated before the code space is considered exhausted.
pub const MAX_CODE_ATTEMPTS: usize = 64;

/// The set of identity codes already in use.
pub trait IdentifierSet: Sync {
    fn contains(&self, id: &str) -> impl Future<Output = CourierResult<bool>> + Send;
}

/// Freshly issued identity material. Persisting it is the caller's job.
#[derive(Clone)]
pub struct IssuedIdentity {
    pub id: String,
    pub public_key_pem: String,
    pub private_key_pem: String,
}

impl std::fmt::Debug for IssuedIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedIdentity")
            .field("id", &self.id)
            .field("public_key_pem", &self.public_key_pem)
            .finish_non_exhaustive()
    }
}

/// Generates key pairs and identity codes.
#[derive(Debug, Clone, Copy)]
pub struct KeyIssuer {
    bits: usize,
}

impl Default for KeyIssuer {
    fn default() -> Self {
        Self { bits: MIN_RSA_BITS }
    }
}

impl KeyIssuer {
    /// Issuer producing `bits`-bit RSA keys. Anything under [`MIN_RSA_BITS`] is refused.
    pub fn new(bits: usize) -> Result<Self, CryptoError> {
        if bits < MIN_RSA_BITS {
            return Err(CryptoError::KeyGeneration(format!(
                "{bits}-bit keys are below the {MIN_RSA_BITS}-bit floor"
            )));
        }
        Ok(Self { bits })
    }

    pub fn bits(&self) -> usize {
        self.bits
    }

    /// Issue a key pair and a code no existing identity holds.
    ///
    /// Key generation is CPU-bound and runs on the blocking pool.
    pub async fn issue<S: IdentifierSet>(&self, live: &S) -> CourierResult<IssuedIdentity> {
        let bits = self.bits;
        let (public_key_pem, private_key_pem) =
            tokio::task::spawn_blocking(move || generate_keypair(bits))
                .await
                .map_err(|e| CourierError::KeyGeneration(e.to_string()))??;

        let id = allocate_code(live).await?;
        tracing::debug!(id = %id, bits, "Issued identity keys");

        Ok(IssuedIdentity {
            id,
            public_key_pem,
            private_key_pem,
        })
    }
}

/// Generate an RSA key pair as (SPKI PEM, PKCS#8 PEM).
pub fn generate_keypair(bits: usize) -> Result<(String, String), CryptoError> {
    let private = RsaPrivateKey::new(&mut rand_core::OsRng, bits)
        .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;
    let public_pem = private
        .to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;
    let private_pem = private
        .to_pkcs8_pem(LineEnding::LF)
        .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;
    Ok((public_pem, private_pem.to_string()))
}

/// A random candidate code.
pub fn generate_code() -> String {
    let bytes: [u8; CODE_BYTES] = rand::random();
    hex::encode(bytes)
}

/// Draw codes until one is free in `live`.
pub async fn allocate_code<S: IdentifierSet>(live: &S) -> CourierResult<String> {
    for _ in 0..MAX_CODE_ATTEMPTS {
        let code = generate_code();
        if !live.contains(&code).await? {
            return Ok(code);
        }
        tracing::debug!(code = %code, "Identity code collision, drawing again");
    }
    Err(CourierError::KeyGeneration(format!(
        "no free identity code after {MAX_CODE_ATTEMPTS} attempts"
    )))
}

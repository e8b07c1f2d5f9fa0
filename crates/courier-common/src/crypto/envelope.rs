//! Hybrid encryption envelope.
//!
//! # Format
//! ```text
//! encryptedMessage = base64( IV[16] || AES-256-CBC-PKCS7(key, IV, plaintext) )
//! encryptedAESKey  = base64( RSA-OAEP-SHA1(recipient_public_key, key[32]) )
//! ```
//! The IV length is fixed and never sent separately. Every [`seal`] draws a
//! fresh key and IV from the OS CSPRNG.
//!
//! OAEP uses SHA-1 for both the label digest and MGF1, the default of
//! node-forge's `RSA-OAEP`, so keys wrapped by existing web clients open here
//! and ours open there.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use rand_core::{OsRng, RngCore};
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;
use zeroize::Zeroizing;

use super::CryptoError;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// One-time symmetric key length (AES-256).
pub const AES_KEY_LEN: usize = 32;
/// IV length, equal to the AES block size.
pub const IV_LEN: usize = 16;

/// Output of [`seal`], ready to be posted as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedMessage {
    pub encrypted_message: String,
    pub encrypted_aes_key: String,
}

/// Encrypt `plaintext` so that only the holder of `recipient`'s private key can read it.
pub fn seal(plaintext: &[u8], recipient: &RsaPublicKey) -> Result<SealedMessage, CryptoError> {
    let mut key = Zeroizing::new([0u8; AES_KEY_LEN]);
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut key[..]);
    OsRng.fill_bytes(&mut iv);

    let ciphertext = Aes256CbcEnc::new_from_slices(&key[..], &iv)
        .map_err(|_| CryptoError::Encryption)?
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut body = Vec::with_capacity(IV_LEN + ciphertext.len());
    body.extend_from_slice(&iv);
    body.extend_from_slice(&ciphertext);

    let wrapped = recipient
        .encrypt(&mut OsRng, Oaep::new::<Sha1>(), &key[..])
        .map_err(|_| CryptoError::Encryption)?;

    Ok(SealedMessage {
        encrypted_message: B64.encode(body),
        encrypted_aes_key: B64.encode(wrapped),
    })
}

/// Recover the plaintext of an envelope addressed to `private_key`.
///
/// Every failure collapses into [`CryptoError::Decryption`]; callers decide
/// per message what to show instead.
pub fn open(
    encrypted_message: &str,
    encrypted_aes_key: &str,
    private_key: &RsaPrivateKey,
) -> Result<Vec<u8>, CryptoError> {
    let wrapped = B64
        .decode(encrypted_aes_key)
        .map_err(|_| CryptoError::Decryption)?;
    let key = Zeroizing::new(
        private_key
            .decrypt(Oaep::new::<Sha1>(), &wrapped)
            .map_err(|_| CryptoError::Decryption)?,
    );
    if key.len() != AES_KEY_LEN {
        return Err(CryptoError::Decryption);
    }

    let body = B64
        .decode(encrypted_message)
        .map_err(|_| CryptoError::Decryption)?;
    // At least one full block after the IV, and whole blocks only.
    if body.len() <= IV_LEN || (body.len() - IV_LEN) % IV_LEN != 0 {
        return Err(CryptoError::Decryption);
    }
    let (iv, ciphertext) = body.split_at(IV_LEN);

    Aes256CbcDec::new_from_slices(&key[..], iv)
        .map_err(|_| CryptoError::Decryption)?
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::Decryption)
}

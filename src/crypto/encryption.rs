//! AES-256-GCM authenticated encryption.
//!
//! `seal` and `open` take the nonce explicitly because the envelope
//! stores it in its own field.  Callers draw a fresh nonce with
//! `generate_nonce` for every seal; a (key, nonce) pair is never reused.
//!
//! The returned ciphertext carries the 16-byte auth tag at its end:
//!   [ ciphertext | 16-byte auth tag ]

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::rngs::OsRng;
use rand::TryRngCore;

use super::keys::MasterKey;
use crate::errors::{PassVaultError, Result};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Draw a fresh random nonce from the OS.
///
/// Nonces are random rather than counter-based so that no state has to
/// survive between sessions.
pub fn generate_nonce() -> Result<[u8; NONCE_LEN]> {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng
        .try_fill_bytes(&mut nonce)
        .map_err(|e| PassVaultError::Random(e.to_string()))?;
    Ok(nonce)
}

/// Encrypt and authenticate `plaintext`, binding `associated_data`.
pub fn seal(
    key: &MasterKey,
    nonce: &[u8; NONCE_LEN],
    plaintext: &[u8],
    associated_data: &[u8],
) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| PassVaultError::Encryption(format!("invalid key length: {e}")))?;

    cipher
        .encrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: plaintext,
                aad: associated_data,
            },
        )
        .map_err(|e| PassVaultError::Encryption(format!("encryption error: {e}")))
}

/// Verify and decrypt data produced by `seal`.
///
/// Any mismatch (key, nonce, ciphertext, tag or associated data) yields
/// `AuthenticationFailed`; no plaintext is ever returned in that case.
pub fn open(
    key: &MasterKey,
    nonce: &[u8; NONCE_LEN],
    ciphertext_with_tag: &[u8],
    associated_data: &[u8],
) -> Result<Vec<u8>> {
    if ciphertext_with_tag.len() < TAG_LEN {
        return Err(PassVaultError::AuthenticationFailed);
    }

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|_| PassVaultError::AuthenticationFailed)?;

    cipher
        .decrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: ciphertext_with_tag,
                aad: associated_data,
            },
        )
        .map_err(|_| PassVaultError::AuthenticationFailed)
}

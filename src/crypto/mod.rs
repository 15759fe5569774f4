//! Cryptographic primitives for PassVault.
//!
//! This module provides:
//! - Argon2id password-based key derivation (`kdf`)
//! - AES-256-GCM sealing and opening with associated data (`encryption`)
//! - The zeroizing `MasterKey` holder (`keys`)

pub mod encryption;
pub mod kdf;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{seal, open, derive, KdfParams, ...};
pub use encryption::{generate_nonce, open, seal, NONCE_LEN, TAG_LEN};
pub use kdf::{derive, generate_salt, KdfParams, SALT_LEN};
pub use keys::{MasterKey, KEY_LEN};

//! Integration tests for the PassVault crypto module.

use passvault::crypto::kdf::MIN_MEMORY_KIB;
use passvault::crypto::{
    derive, generate_nonce, generate_salt, open, seal, KdfParams, MasterKey, TAG_LEN,
};
use passvault::errors::PassVaultError;

fn fast_params() -> KdfParams {
    KdfParams::new(1, MIN_MEMORY_KIB, 1)
}

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

#[test]
fn derive_is_deterministic() {
    let salt = [7u8; 16];
    let a = derive(b"correct horse", &salt, &fast_params()).unwrap();
    let b = derive(b"correct horse", &salt, &fast_params()).unwrap();
    assert_eq!(a.as_bytes(), b.as_bytes());
}

#[test]
fn derive_depends_on_password_salt_and_params() {
    let salt = [7u8; 16];
    let base = derive(b"correct horse", &salt, &fast_params()).unwrap();

    let other_pw = derive(b"correct horsf", &salt, &fast_params()).unwrap();
    let other_salt = derive(b"correct horse", &[8u8; 16], &fast_params()).unwrap();
    let other_params =
        derive(b"correct horse", &salt, &KdfParams::new(2, MIN_MEMORY_KIB, 1)).unwrap();

    assert_ne!(base.as_bytes(), other_pw.as_bytes());
    assert_ne!(base.as_bytes(), other_salt.as_bytes());
    assert_ne!(base.as_bytes(), other_params.as_bytes());
}

#[test]
fn derive_accepts_empty_password() {
    let key = derive(b"", &[1u8; 16], &fast_params()).unwrap();
    assert_eq!(key.as_bytes().len(), 32);
}

#[test]
fn derive_rejects_out_of_range_params() {
    let err = derive(b"pw", &[1u8; 16], &KdfParams::new(0, MIN_MEMORY_KIB, 1)).unwrap_err();
    assert!(matches!(err, PassVaultError::Kdf(_)));
}

#[test]
fn salts_are_random() {
    assert_ne!(generate_salt().unwrap(), generate_salt().unwrap());
}

// ---------------------------------------------------------------------------
// AEAD
// ---------------------------------------------------------------------------

#[test]
fn seal_open_roundtrip() {
    let key = MasterKey::new([0xABu8; 32]);
    let nonce = generate_nonce().unwrap();
    let plaintext = br#"{"entries":[]}"#;

    let ciphertext = seal(&key, &nonce, plaintext, b"header").unwrap();
    assert_eq!(ciphertext.len(), plaintext.len() + TAG_LEN);

    let recovered = open(&key, &nonce, &ciphertext, b"header").unwrap();
    assert_eq!(recovered, plaintext);
}

#[test]
fn open_with_wrong_key_fails() {
    let nonce = generate_nonce().unwrap();
    let ciphertext = seal(&MasterKey::new([0x11; 32]), &nonce, b"secret", b"").unwrap();

    let err = open(&MasterKey::new([0x22; 32]), &nonce, &ciphertext, b"").unwrap_err();
    assert!(matches!(err, PassVaultError::AuthenticationFailed));
}

#[test]
fn open_with_wrong_associated_data_fails() {
    let key = MasterKey::new([0x33; 32]);
    let nonce = generate_nonce().unwrap();
    let ciphertext = seal(&key, &nonce, b"secret", b"v1").unwrap();

    let err = open(&key, &nonce, &ciphertext, b"v2").unwrap_err();
    assert!(matches!(err, PassVaultError::AuthenticationFailed));
}

#[test]
fn every_single_bit_flip_is_detected() {
    let key = MasterKey::new([0x44; 32]);
    let nonce = generate_nonce().unwrap();
    let ciphertext = seal(&key, &nonce, b"hunter2", b"").unwrap();

    for i in 0..ciphertext.len() {
        let mut tampered = ciphertext.clone();
        tampered[i] ^= 0x01;
        assert!(
            open(&key, &nonce, &tampered, b"").is_err(),
            "flip at byte {i} went unnoticed"
        );
    }
}

#[test]
fn truncated_ciphertext_fails() {
    let key = MasterKey::new([0x55; 32]);
    let err = open(&key, &[0u8; 12], &[0u8; TAG_LEN - 1], b"").unwrap_err();
    assert!(matches!(err, PassVaultError::AuthenticationFailed));
}

#[test]
fn nonces_are_random() {
    assert_ne!(generate_nonce().unwrap(), generate_nonce().unwrap());
}

//! Password-based key derivation using Argon2id.
//!
//! Argon2id is a memory-hard KDF that protects against brute-force and
//! GPU-based attacks.  The parameters travel with every vault file (see
//! `KdfParams`) so a vault always reopens with the cost it was created with.

use std::time::{Duration, Instant};

use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use rand::TryRngCore;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::keys::{MasterKey, KEY_LEN};
use crate::errors::{PassVaultError, Result};

/// Length of the salt in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Minimum safe memory cost in KiB (8 MB).
pub const MIN_MEMORY_KIB: u32 = 8_192;

/// Largest memory cost we agree to allocate (4 GB), so a hostile vault
/// file cannot make unlock exhaust the machine.
pub const MAX_MEMORY_KIB: u32 = 4_194_304;

/// Upper bound for iterations and lanes.
pub const MAX_TIME_COST: u32 = 64;
pub const MAX_PARALLELISM: u32 = 64;

/// Argon2id cost parameters.
///
/// Serialized with the short names used in the envelope's `kdf` object:
/// `{"time": .., "memory": .., "parallelism": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Number of iterations.
    #[serde(rename = "time")]
    pub time_cost: u32,
    /// Memory cost in KiB.
    #[serde(rename = "memory")]
    pub memory_cost: u32,
    /// Parallelism lanes.
    pub parallelism: u32,
}

impl Default for KdfParams {
    /// 64 MB, 3 iterations, 4 lanes: a few hundred milliseconds per unlock
    /// on commodity hardware.
    fn default() -> Self {
        Self {
            time_cost: 3,
            memory_cost: 65_536,
            parallelism: 4,
        }
    }
}

impl KdfParams {
    pub fn new(time_cost: u32, memory_cost: u32, parallelism: u32) -> Self {
        Self {
            time_cost,
            memory_cost,
            parallelism,
        }
    }

    /// Check the parameters against the supported bounds.
    ///
    /// This is a hard validation: parameters that fail it are never
    /// used, not even to try an unlock.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_TIME_COST).contains(&self.time_cost) {
            return Err(PassVaultError::Kdf(format!(
                "time cost must be between 1 and {MAX_TIME_COST} (got {})",
                self.time_cost
            )));
        }
        if !(1..=MAX_PARALLELISM).contains(&self.parallelism) {
            return Err(PassVaultError::Kdf(format!(
                "parallelism must be between 1 and {MAX_PARALLELISM} (got {})",
                self.parallelism
            )));
        }
        if !(MIN_MEMORY_KIB..=MAX_MEMORY_KIB).contains(&self.memory_cost) {
            return Err(PassVaultError::Kdf(format!(
                "memory cost must be between {MIN_MEMORY_KIB} and {MAX_MEMORY_KIB} KiB (got {})",
                self.memory_cost
            )));
        }
        // Argon2 needs at least 8 KiB per lane.
        if self.memory_cost < self.parallelism.saturating_mul(8) {
            return Err(PassVaultError::Kdf(format!(
                "memory cost {} KiB is too small for {} lanes",
                self.memory_cost, self.parallelism
            )));
        }
        Ok(())
    }

    /// Benchmark this machine and return parameters whose derivation
    /// takes at least `target`.
    ///
    /// Memory and lanes stay at the defaults; only the iteration count
    /// is scaled from a single-iteration measurement.
    pub fn calibrate(target: Duration) -> Result<Self> {
        let base = Self {
            time_cost: 1,
            ..Self::default()
        };
        let salt = [0u8; SALT_LEN];

        let started = Instant::now();
        derive(b"passvault-calibration", &salt, &base)?;
        let elapsed = started.elapsed().max(Duration::from_millis(1));

        let ratio = target.as_secs_f64() / elapsed.as_secs_f64();
        let time_cost = (ratio.ceil() as u32).clamp(1, MAX_TIME_COST);

        debug!(
            single_pass_ms = elapsed.as_millis() as u64,
            time_cost, "calibrated KDF parameters"
        );

        Ok(Self { time_cost, ..base })
    }
}

/// Derive a 32-byte key from a password and salt with explicit Argon2id
/// parameters.
///
/// The same password + salt + params will always produce the same key.
pub fn derive(password: &[u8], salt: &[u8; SALT_LEN], params: &KdfParams) -> Result<MasterKey> {
    params.validate()?;

    let argon2_params = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| PassVaultError::Kdf(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut key = MasterKey::zeroed();
    argon2
        .hash_password_into(password, salt, key.as_mut_bytes())
        .map_err(|e| PassVaultError::Kdf(format!("Argon2id hashing failed: {e}")))?;

    Ok(key)
}

/// Generate a cryptographically random 16-byte salt.
pub fn generate_salt() -> Result<[u8; SALT_LEN]> {
    let mut salt = [0u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|e| PassVaultError::Random(e.to_string()))?;
    Ok(salt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> KdfParams {
        KdfParams::new(1, MIN_MEMORY_KIB, 1)
    }

    #[test]
    fn default_params_pass_validation() {
        assert!(KdfParams::default().validate().is_ok());
    }

    #[test]
    fn rejects_memory_below_floor() {
        let params = KdfParams::new(3, 4_096, 1);
        let err = params.validate().unwrap_err();
        assert!(matches!(err, PassVaultError::Kdf(_)));
    }

    #[test]
    fn rejects_zero_time_and_parallelism() {
        assert!(KdfParams::new(0, MIN_MEMORY_KIB, 1).validate().is_err());
        assert!(KdfParams::new(1, MIN_MEMORY_KIB, 0).validate().is_err());
    }

    #[test]
    fn rejects_oversized_params() {
        assert!(KdfParams::new(MAX_TIME_COST + 1, MIN_MEMORY_KIB, 1)
            .validate()
            .is_err());
        assert!(KdfParams::new(1, MAX_MEMORY_KIB + 1, 1).validate().is_err());
        assert!(KdfParams::new(1, MIN_MEMORY_KIB, MAX_PARALLELISM + 1)
            .validate()
            .is_err());
    }

    #[test]
    fn derive_rejects_invalid_params_before_hashing() {
        let salt = [7u8; SALT_LEN];
        let result = derive(b"pw", &salt, &KdfParams::new(1, 1_024, 1));
        assert!(matches!(result, Err(PassVaultError::Kdf(_))));
    }

    #[test]
    fn derive_is_deterministic() {
        let salt = [1u8; SALT_LEN];
        let a = derive(b"password", &salt, &fast()).unwrap();
        let b = derive(b"password", &salt, &fast()).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn params_change_the_key() {
        let salt = [1u8; SALT_LEN];
        let a = derive(b"password", &salt, &fast()).unwrap();
        let b = derive(b"password", &salt, &KdfParams::new(2, MIN_MEMORY_KIB, 1)).unwrap();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn salts_are_random() {
        assert_ne!(generate_salt().unwrap(), generate_salt().unwrap());
    }

    #[test]
    fn serializes_with_envelope_field_names() {
        let json = serde_json::to_value(KdfParams::new(2, 65_536, 1)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"time": 2, "memory": 65_536, "parallelism": 1})
        );
    }
}

//! On-disk vault envelope.
//!
//! A vault file is a small JSON document:
//!
//! ```text
//! {
//!   "version": 1,
//!   "kdf": {"time": 3, "memory": 65536, "parallelism": 4},
//!   "salt": "<base64, 16 bytes>",
//!   "nonce": "<base64, 12 bytes>",
//!   "ciphertext": "<base64, AES-256-GCM output incl. tag>"
//! }
//! ```
//!
//! - **version**: format version (currently `1`).  Unknown versions are
//!   rejected before any other field is looked at.
//! - **kdf**: Argon2id parameters used to derive the key.
//! - **salt** / **nonce**: random per vault / per write.
//! - **ciphertext**: the encrypted entry list.
//!
//! `decode` reports exactly which field is broken so the caller can show
//! a useful diagnostic; every decode failure still blocks unlocking.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;

use crate::crypto::kdf::{KdfParams, SALT_LEN};
use crate::crypto::NONCE_LEN;
use crate::errors::{FormatError, PassVaultError, Result};

/// Current envelope format version.
pub const CURRENT_VERSION: u32 = 1;

/// The versioned structure wrapping everything needed to reopen a vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub version: u32,
    pub kdf: KdfParams,
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Associated data binding the version and KDF parameters to the
    /// ciphertext, so neither can be swapped without failing decryption.
    pub fn associated_data(&self) -> Vec<u8> {
        associated_data(self.version, &self.kdf)
    }
}

/// Build the associated data for a given version and parameter set.
pub fn associated_data(version: u32, kdf: &KdfParams) -> Vec<u8> {
    format!(
        "passvault/v{version}/argon2id/t={}/m={}/p={}",
        kdf.time_cost, kdf.memory_cost, kdf.parallelism
    )
    .into_bytes()
}

// ---------------------------------------------------------------------------
// Wire representation
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct WireEnvelopeOut<'a> {
    version: u32,
    kdf: &'a KdfParams,
    salt: String,
    nonce: String,
    ciphertext: String,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Serialize an envelope to its on-disk bytes (pretty-printed JSON).
pub fn encode(envelope: &Envelope) -> Result<Vec<u8>> {
    let wire = WireEnvelopeOut {
        version: envelope.version,
        kdf: &envelope.kdf,
        salt: BASE64.encode(envelope.salt),
        nonce: BASE64.encode(envelope.nonce),
        ciphertext: BASE64.encode(&envelope.ciphertext),
    };

    serde_json::to_vec_pretty(&wire)
        .map_err(|e| PassVaultError::Serialization(format!("envelope: {e}")))
}

/// Parse on-disk bytes back into an envelope.
///
/// Each field is pulled out of the JSON object by hand so that a missing
/// or mistyped field is reported by name.
pub fn decode(bytes: &[u8]) -> std::result::Result<Envelope, FormatError> {
    let value: serde_json::Value =
        serde_json::from_slice(bytes).map_err(|e| FormatError::Malformed(e.to_string()))?;

    let object = value
        .as_object()
        .ok_or_else(|| FormatError::Malformed("top level is not a JSON object".into()))?;

    // Version first: a blob we do not understand is never parsed further.
    let version = required(object, "version")?
        .as_u64()
        .ok_or_else(|| FormatError::Malformed("'version' is not an unsigned integer".into()))?;
    if version != u64::from(CURRENT_VERSION) {
        return Err(FormatError::UnsupportedVersion(version));
    }

    let kdf = decode_kdf(required(object, "kdf")?)?;
    let salt = decode_fixed::<SALT_LEN>("salt", required(object, "salt")?)?;
    let nonce = decode_fixed::<NONCE_LEN>("nonce", required(object, "nonce")?)?;
    let ciphertext = decode_b64("ciphertext", required(object, "ciphertext")?)?;

    Ok(Envelope {
        version: CURRENT_VERSION,
        kdf,
        salt,
        nonce,
        ciphertext,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

type Object = serde_json::Map<String, serde_json::Value>;

/// Look up `key`; absent and `null` both count as missing.
fn required<'a>(
    object: &'a Object,
    key: &'static str,
) -> std::result::Result<&'a serde_json::Value, FormatError> {
    match object.get(key) {
        None | Some(serde_json::Value::Null) => Err(FormatError::MissingField(key)),
        Some(v) => Ok(v),
    }
}

fn decode_kdf(value: &serde_json::Value) -> std::result::Result<KdfParams, FormatError> {
    let object = value
        .as_object()
        .ok_or_else(|| FormatError::InvalidKdfParams("'kdf' is not an object".into()))?;

    let member = |name: &'static str, key: &'static str| -> std::result::Result<u32, FormatError> {
        let raw = required(object, key)
            .map_err(|_| FormatError::MissingField(name))?
            .as_u64()
            .ok_or_else(|| {
                FormatError::InvalidKdfParams(format!("'{name}' is not an unsigned integer"))
            })?;
        let v = u32::try_from(raw)
            .map_err(|_| FormatError::InvalidKdfParams(format!("'{name}' out of range: {raw}")))?;
        if v == 0 {
            return Err(FormatError::InvalidKdfParams(format!(
                "'{name}' must be positive"
            )));
        }
        Ok(v)
    };

    Ok(KdfParams {
        time_cost: member("kdf.time", "time")?,
        memory_cost: member("kdf.memory", "memory")?,
        parallelism: member("kdf.parallelism", "parallelism")?,
    })
}

fn decode_b64(
    field: &'static str,
    value: &serde_json::Value,
) -> std::result::Result<Vec<u8>, FormatError> {
    let encoded = value.as_str().ok_or_else(|| FormatError::InvalidEncoding {
        field,
        reason: "expected a base64 string".into(),
    })?;
    BASE64
        .decode(encoded)
        .map_err(|e| FormatError::InvalidEncoding {
            field,
            reason: e.to_string(),
        })
}

fn decode_fixed<const N: usize>(
    field: &'static str,
    value: &serde_json::Value,
) -> std::result::Result<[u8; N], FormatError> {
    let bytes = decode_b64(field, value)?;
    let actual = bytes.len();
    bytes.try_into().map_err(|_| FormatError::InvalidLength {
        field,
        expected: N,
        actual,
    })
}

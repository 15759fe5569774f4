use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in PassVault.
#[derive(Debug, Error)]
pub enum PassVaultError {
    // --- Crypto errors ---
    #[error("Key derivation failed: {0}")]
    Kdf(String),

    /// Tag mismatch and wrong password are deliberately the same error.
    #[error("Incorrect password or corrupted vault")]
    AuthenticationFailed,

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Secure random source failed: {0}")]
    Random(String),

    // --- Envelope errors ---
    #[error("Invalid vault format: {0}")]
    Format(#[from] FormatError),

    // --- Storage errors ---
    #[error("Vault not found at {0}")]
    VaultNotFound(PathBuf),

    #[error("Vault already exists at {0}")]
    VaultAlreadyExists(PathBuf),

    #[error("Vault at {0} was modified by another process since it was opened")]
    ConcurrentModification(PathBuf),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // --- Session errors ---
    #[error("Entry '{0}' not found")]
    EntryNotFound(String),

    #[error("Entry '{0}' already exists")]
    DuplicateName(String),

    #[error("Invalid entry: {0}")]
    InvalidEntry(String),

    #[error("Vault session is locked: unlock it again first")]
    LockedSession,

    #[error("Serialization error: {0}")]
    Serialization(String),

    // --- Front-end errors ---
    #[error("Config file error: {0}")]
    Config(String),

    #[error("Keyring error: {0}")]
    Keyring(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,
}

/// Why an envelope could not be decoded.
///
/// Every variant blocks unlocking; they are kept apart only so the
/// caller can report which part of the file is broken.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("not a vault envelope: {0}")]
    Malformed(String),

    #[error("unsupported envelope version {0}")]
    UnsupportedVersion(u64),

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' is not valid base64: {reason}")]
    InvalidEncoding { field: &'static str, reason: String },

    #[error("field '{field}' must decode to {expected} bytes, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid KDF parameters: {0}")]
    InvalidKdfParams(String),

    #[error("decrypted payload is not a valid entry list: {0}")]
    InvalidPayload(String),
}

impl PassVaultError {
    /// Wrap an `io::Error` together with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience type alias for PassVault results.
pub type Result<T> = std::result::Result<T, PassVaultError>;

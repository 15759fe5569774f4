//! The unlocked vault: key + decrypted entries, and the operations on them.
//!
//! `VaultSession` ties the crypto layer, the envelope format and the
//! atomic file store together so front-ends only deal with simple calls
//! like `session.add_entry("Email", Some("alice"), fields)`.
//!
//! A session is either **unlocked** (key and entries resident) or
//! **locked** (both wiped).  Every mutating operation takes `&mut self`,
//! so the borrow checker already serializes access to one session.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::crypto::encryption::{generate_nonce, open, seal};
use crate::crypto::kdf::{derive, generate_salt, KdfParams, SALT_LEN};
use crate::crypto::keys::MasterKey;
use crate::errors::{FormatError, PassVaultError, Result};

use super::entry::{Entry, EntryId, EntryKey, EntryMetadata, EntryUpdate};
use super::format::{self, Envelope, CURRENT_VERSION};
use super::storage;

/// Plaintext layout inside the ciphertext.
#[derive(Serialize)]
struct PayloadOut<'a> {
    entries: &'a [Entry],
}

#[derive(Deserialize)]
struct PayloadIn {
    entries: Vec<Entry>,
}

/// Secret state that only exists while unlocked.
struct Unlocked {
    /// Zeroized on drop.
    key: MasterKey,
    /// Insertion-ordered; each entry wipes itself on drop.
    entries: Vec<Entry>,
}

/// SHA-256 of the file bytes the session last read or wrote.
type Fingerprint = [u8; 32];

/// The main vault handle.  Create one with `VaultSession::create` or
/// `VaultSession::unlock`, then use its methods to manage entries.
pub struct VaultSession {
    /// Path to the vault file on disk.
    path: PathBuf,

    /// KDF parameters the current key was derived with.
    kdf_params: KdfParams,

    /// Salt the current key was derived with.
    salt: [u8; SALT_LEN],

    /// `None` once locked.
    unlocked: Option<Unlocked>,

    /// What we believe is on disk; `None` before the first write.
    fingerprint: Option<Fingerprint>,
}

impl VaultSession {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create a brand-new vault file at `path`.
    ///
    /// Generates a random salt, derives the key from the password, and
    /// writes an empty vault to disk.  Pass `None` for `kdf_params` to use
    /// the defaults.
    pub fn create(path: &Path, password: &[u8], kdf_params: Option<KdfParams>) -> Result<Self> {
        if path.exists() {
            return Err(PassVaultError::VaultAlreadyExists(path.to_path_buf()));
        }

        let kdf_params = kdf_params.unwrap_or_default();
        kdf_params.validate()?;

        let salt = generate_salt()?;
        let key = derive(password, &salt, &kdf_params)?;

        let mut session = Self {
            path: path.to_path_buf(),
            kdf_params,
            salt,
            unlocked: Some(Unlocked {
                key,
                entries: Vec::new(),
            }),
            fingerprint: None,
        };

        // The file may have appeared while the key was being derived.
        let bytes = session.seal_entries()?;
        storage::write_new(path, &bytes)?;
        session.fingerprint = Some(fingerprint(&bytes));
        info!(path = %path.display(), "created vault");

        Ok(session)
    }

    /// Open an existing vault file.
    ///
    /// Reads and decodes the envelope, derives the key from the password
    /// and the stored salt/params, then decrypts.  A wrong password and a
    /// tampered file both yield `AuthenticationFailed`.
    pub fn unlock(path: &Path, password: &[u8]) -> Result<Self> {
        let bytes = storage::read(path)?;
        let envelope = format::decode(&bytes)?;

        let key = derive(password, &envelope.salt, &envelope.kdf)?;

        let plaintext = match open(
            &key,
            &envelope.nonce,
            &envelope.ciphertext,
            &envelope.associated_data(),
        ) {
            Ok(pt) => Zeroizing::new(pt),
            Err(e) => {
                warn!(path = %path.display(), "vault unlock failed");
                return Err(e);
            }
        };

        let payload: PayloadIn = serde_json::from_slice(&plaintext)
            .map_err(|e| FormatError::InvalidPayload(e.to_string()))?;

        info!(
            path = %path.display(),
            entries = payload.entries.len(),
            "unlocked vault"
        );

        Ok(Self {
            path: path.to_path_buf(),
            kdf_params: envelope.kdf,
            salt: envelope.salt,
            unlocked: Some(Unlocked {
                key,
                entries: payload.entries,
            }),
            fingerprint: Some(fingerprint(&bytes)),
        })
    }

    /// Unlock a locked session again from the file on disk.
    ///
    /// On failure the session stays locked.
    pub fn reunlock(&mut self, password: &[u8]) -> Result<()> {
        *self = Self::unlock(&self.path, password)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Entry operations (in memory only until `save`)
    // ------------------------------------------------------------------

    /// Add a new entry and return its id.
    ///
    /// Names are unique (exact, case-sensitive match); a duplicate leaves
    /// the collection unchanged.
    pub fn add_entry(
        &mut self,
        name: &str,
        username: Option<&str>,
        fields: BTreeMap<String, String>,
    ) -> Result<EntryId> {
        let state = self.state_mut()?;

        if state.entries.iter().any(|e| e.name == name) {
            return Err(PassVaultError::DuplicateName(name.to_string()));
        }

        let entry = Entry::new(name, username, fields)?;
        let id = entry.id;
        state.entries.push(entry);

        debug!(entry = %name, %id, "added entry");
        Ok(id)
    }

    /// Look up an entry by name or id.
    pub fn get_entry<'k>(&self, key: impl Into<EntryKey<'k>>) -> Result<&Entry> {
        let key = key.into();
        self.state()?
            .entries
            .iter()
            .find(|e| e.matches(&key))
            .ok_or_else(|| PassVaultError::EntryNotFound(key.to_string()))
    }

    /// Apply `update` to one entry.
    ///
    /// A rename onto another entry's name fails with `DuplicateName`; the
    /// entry is left untouched on any error.
    pub fn update_entry<'k>(
        &mut self,
        key: impl Into<EntryKey<'k>>,
        update: EntryUpdate,
    ) -> Result<()> {
        let key = key.into();
        update.validate()?;

        let state = self.state_mut()?;
        let index = state
            .entries
            .iter()
            .position(|e| e.matches(&key))
            .ok_or_else(|| PassVaultError::EntryNotFound(key.to_string()))?;

        if let Some(new_name) = &update.rename {
            let taken = state
                .entries
                .iter()
                .enumerate()
                .any(|(i, e)| i != index && e.name == *new_name);
            if taken {
                return Err(PassVaultError::DuplicateName(new_name.clone()));
            }
        }

        update.apply_to(&mut state.entries[index]);
        debug!(key = %key, "updated entry");
        Ok(())
    }

    /// Remove an entry and hand it back to the caller.
    pub fn remove_entry<'k>(&mut self, key: impl Into<EntryKey<'k>>) -> Result<Entry> {
        let key = key.into();
        let state = self.state_mut()?;
        let index = state
            .entries
            .iter()
            .position(|e| e.matches(&key))
            .ok_or_else(|| PassVaultError::EntryNotFound(key.to_string()))?;

        debug!(key = %key, "removed entry");
        Ok(state.entries.remove(index))
    }

    /// Metadata for all entries, in insertion order.
    pub fn list_entries(&self) -> Result<Vec<EntryMetadata>> {
        Ok(self.state()?.entries.iter().map(Entry::metadata).collect())
    }

    /// Number of entries in the vault.
    pub fn entry_count(&self) -> Result<usize> {
        Ok(self.state()?.entries.len())
    }

    // ------------------------------------------------------------------
    // Password
    // ------------------------------------------------------------------

    /// Switch to a new master password.
    ///
    /// Draws a new salt and derives a new key (with `kdf_params` if
    /// given, otherwise the current ones).  Nothing is written until the
    /// next `save`; on error the session keeps its old key.
    pub fn change_password(
        &mut self,
        new_password: &[u8],
        kdf_params: Option<KdfParams>,
    ) -> Result<()> {
        self.state()?;

        let kdf_params = kdf_params.unwrap_or(self.kdf_params);
        kdf_params.validate()?;
        let salt = generate_salt()?;
        let key = derive(new_password, &salt, &kdf_params)?;

        let state = self.state_mut()?;
        state.key = key;
        self.salt = salt;
        self.kdf_params = kdf_params;

        info!(path = %self.path.display(), "master password changed");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Encrypt the entries with a fresh nonce and write them atomically.
    ///
    /// Refuses with `ConcurrentModification` if the file changed on disk
    /// since this session last read or wrote it.  On any error the
    /// in-memory state is unchanged and the call can be retried.
    pub fn save(&mut self) -> Result<()> {
        self.state()?;
        self.check_unmodified()?;
        self.write_envelope()
    }

    /// Like `save`, but overwrites external changes (last writer wins).
    pub fn force_save(&mut self) -> Result<()> {
        self.state()?;
        self.write_envelope()
    }

    fn write_envelope(&mut self) -> Result<()> {
        let entry_count = self.state()?.entries.len();
        let bytes = self.seal_entries()?;

        storage::write(&self.path, &bytes)?;
        self.fingerprint = Some(fingerprint(&bytes));

        info!(
            path = %self.path.display(),
            entries = entry_count,
            bytes = bytes.len(),
            "saved vault"
        );
        Ok(())
    }

    /// Encrypt the entries under a fresh nonce into envelope bytes.
    fn seal_entries(&self) -> Result<Vec<u8>> {
        let state = self.state()?;

        let plaintext = Zeroizing::new(
            serde_json::to_vec(&PayloadOut {
                entries: &state.entries,
            })
            .map_err(|e| PassVaultError::Serialization(format!("entries: {e}")))?,
        );

        let associated_data = format::associated_data(CURRENT_VERSION, &self.kdf_params);
        let nonce = generate_nonce()?;
        let ciphertext = seal(&state.key, &nonce, &plaintext, &associated_data)?;

        let envelope = Envelope {
            version: CURRENT_VERSION,
            kdf: self.kdf_params,
            salt: self.salt,
            nonce,
            ciphertext,
        };
        format::encode(&envelope)
    }

    fn check_unmodified(&self) -> Result<()> {
        let on_disk = match storage::read(&self.path) {
            Ok(bytes) => Some(fingerprint(&bytes)),
            Err(PassVaultError::VaultNotFound(_)) => None,
            Err(e) => return Err(e),
        };

        let unchanged = match (&self.fingerprint, &on_disk) {
            (None, None) => true,
            (Some(expected), Some(actual)) => bool::from(expected[..].ct_eq(&actual[..])),
            _ => false,
        };

        if unchanged {
            Ok(())
        } else {
            warn!(path = %self.path.display(), "vault changed on disk since it was opened");
            Err(PassVaultError::ConcurrentModification(self.path.clone()))
        }
    }

    // ------------------------------------------------------------------
    // Lock
    // ------------------------------------------------------------------

    /// Wipe the key and the decrypted entries.
    ///
    /// Every entry operation fails with `LockedSession` afterwards, until
    /// `reunlock` succeeds.  Locking twice is a no-op.
    pub fn lock(&mut self) {
        if self.unlocked.take().is_some() {
            info!(path = %self.path.display(), "locked vault");
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Returns the path to the vault file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the KDF parameters of the current key.
    pub fn kdf_params(&self) -> KdfParams {
        self.kdf_params
    }

    /// Returns `true` once `lock` has been called.
    pub fn is_locked(&self) -> bool {
        self.unlocked.is_none()
    }

    fn state(&self) -> Result<&Unlocked> {
        self.unlocked.as_ref().ok_or(PassVaultError::LockedSession)
    }

    fn state_mut(&mut self) -> Result<&mut Unlocked> {
        self.unlocked.as_mut().ok_or(PassVaultError::LockedSession)
    }
}

fn fingerprint(bytes: &[u8]) -> Fingerprint {
    Sha256::digest(bytes).into()
}

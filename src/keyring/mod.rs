//! Opt-in OS keyring caching of a vault's master password.
//!
//! Nothing is cached unless the user runs `passvault auth keyring`; the
//! password is then stored under the canonical vault path so that
//! `./passvault.vault` and its absolute path share one credential.

use std::path::{Path, PathBuf};

use tracing::debug;
use zeroize::Zeroizing;

use crate::errors::{PassVaultError, Result};

/// Service name used in the OS keyring.
const SERVICE_NAME: &str = "passvault";

/// The keyring slot belonging to one vault file.
pub struct CachedPassword {
    account: String,
    entry: keyring::Entry,
}

impl CachedPassword {
    /// Open the slot for the vault at `vault_path`.
    pub fn for_vault(vault_path: &Path) -> Result<Self> {
        let account = account_name(vault_path);
        let entry =
            keyring::Entry::new(SERVICE_NAME, &account).map_err(|e| keyring_err("open", e))?;
        Ok(Self { account, entry })
    }

    /// The cached password, or `None` when nothing is stored.
    pub fn load(&self) -> Result<Option<Zeroizing<String>>> {
        match self.entry.get_password() {
            Ok(pw) => Ok(Some(Zeroizing::new(pw))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(keyring_err("read", e)),
        }
    }

    pub fn store(&self, password: &str) -> Result<()> {
        self.entry
            .set_password(password)
            .map_err(|e| keyring_err("store", e))?;
        debug!(account = %self.account, "cached master password in keyring");
        Ok(())
    }

    /// Remove the cached password; a missing entry is not an error.
    pub fn forget(&self) -> Result<()> {
        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(keyring_err("delete", e)),
        }
    }
}

/// `vault:<canonical path>`, falling back to the path as given when it
/// cannot be resolved (e.g. the file does not exist yet).
fn account_name(vault_path: &Path) -> String {
    let resolved = vault_path
        .canonicalize()
        .unwrap_or_else(|_| PathBuf::from(vault_path));
    format!("vault:{}", resolved.display())
}

fn keyring_err(action: &str, e: keyring::Error) -> PassVaultError {
    PassVaultError::Keyring(format!("failed to {action} keyring entry: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn relative_and_absolute_paths_share_an_account() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("v.vault");
        std::fs::write(&path, b"x").unwrap();

        let via_dots = dir.path().join(".").join("v.vault");
        assert_eq!(account_name(&path), account_name(&via_dots));
        assert!(account_name(&path).starts_with("vault:"));
    }

    #[test]
    fn missing_file_uses_path_as_given() {
        assert_eq!(
            account_name(Path::new("/nonexistent/dir/a.vault")),
            "vault:/nonexistent/dir/a.vault"
        );
    }
}

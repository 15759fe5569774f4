//! `passvault auth keyring`: cache the master password in the OS keyring.
//!
//! - `passvault auth keyring` saves the password to the OS keyring
//! - `passvault auth keyring --delete` removes it again
//!
//! When the keyring feature is not compiled in, this returns an error
//! telling the user how to enable it.

use crate::cli::Cli;
use crate::errors::Result;

/// Execute `passvault auth keyring`.
pub fn execute_keyring(cli: &Cli, delete: bool) -> Result<()> {
    #[cfg(feature = "keyring-store")]
    {
        use crate::cli::output;

        let path = crate::cli::vault_path(cli)?;
        let slot = crate::keyring::CachedPassword::for_vault(&path)?;

        if delete {
            slot.forget()?;
            output::success("Password removed from OS keyring.");
        } else {
            // Skip the keyring lookup: the user is setting the password explicitly.
            let password = crate::cli::prompt_password_for_vault(None)?;
            let _session = crate::vault::VaultSession::unlock(&path, password.as_bytes())?;

            slot.store(&password)?;
            output::success("Password saved to OS keyring. Future unlocks will be automatic.");
        }

        Ok(())
    }

    #[cfg(not(feature = "keyring-store"))]
    {
        let _ = (cli, delete);
        Err(crate::errors::PassVaultError::Keyring(
            "keyring support not compiled; rebuild with `cargo build --features keyring-store`"
                .into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn keyring_disabled_returns_error() {
        #[cfg(not(feature = "keyring-store"))]
        {
            use clap::Parser;
            let cli = crate::cli::Cli::parse_from(["passvault", "auth", "keyring"]);
            let result = super::execute_keyring(&cli, false);
            let msg = result.unwrap_err().to_string();
            assert!(
                msg.contains("keyring support not compiled"),
                "unexpected error: {msg}"
            );
        }
    }
}

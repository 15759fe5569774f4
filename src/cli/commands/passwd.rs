//! `passvault passwd`: change the vault master password.
//!
//! Unlocks with the current password, draws a new salt, derives a new key
//! from the new password and rewrites the vault atomically.  Entries are
//! carried over untouched.

use crate::cli::output;
use crate::cli::{prompt_new_password, vault_path, Cli, NEW_PASSWORD_ENV};
use crate::errors::Result;

/// Execute the `passwd` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let path = vault_path(cli)?;

    output::info("Enter your current vault password.");
    let mut session = super::unlock(&path)?;

    output::info("Choose your new vault password.");
    let new_password = prompt_new_password(NEW_PASSWORD_ENV)?;

    session.change_password(new_password.as_bytes(), None)?;
    session.save()?;

    output::success(&format!(
        "Master password changed ({} entries re-encrypted)",
        session.entry_count()?
    ));

    #[cfg(feature = "keyring-store")]
    {
        let slot = crate::keyring::CachedPassword::for_vault(&path)?;
        if let Ok(Some(_)) = slot.load() {
            slot.store(&new_password)?;
            output::info("Updated the password cached in the OS keyring.");
        }
    }

    Ok(())
}

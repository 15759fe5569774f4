//! `passvault remove`: remove an entry from the vault.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{vault_path, Cli};
use crate::errors::{PassVaultError, Result};

/// Execute the `remove` command.
pub fn execute(cli: &Cli, name: &str, force: bool) -> Result<()> {
    let path = vault_path(cli)?;

    // Unless --force is set, ask for confirmation before removing.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Remove entry '{name}'?"))
            .default(false)
            .interact()
            .map_err(|e| PassVaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let mut session = super::unlock(&path)?;
    session.remove_entry(name)?;
    session.save()?;

    output::success(&format!("Removed entry '{name}'"));
    Ok(())
}

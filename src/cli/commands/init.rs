//! `passvault init`: create a new, empty vault.

use crate::cli::output;
use crate::cli::{prompt_new_password, vault_path, Cli, KdfArgs, PASSWORD_ENV};
use crate::config::Settings;
use crate::errors::{PassVaultError, Result};
use crate::vault::VaultSession;

/// Execute the `init` command.
pub fn execute(cli: &Cli, kdf: &KdfArgs) -> Result<()> {
    let path = vault_path(cli)?;

    // 1. Refuse to clobber an existing vault before asking for a password.
    if path.exists() {
        output::tip("Use `passvault add` to add entries to the existing vault.");
        return Err(PassVaultError::VaultAlreadyExists(path));
    }

    // 2. Resolve KDF parameters: config file, then flags.
    let cwd = std::env::current_dir().map_err(|e| PassVaultError::io(".", e))?;
    let settings = Settings::load(&cwd)?;
    let params = kdf.resolve(settings.kdf_params())?;

    // 3. Prompt for a new password (with confirmation) and create the file.
    let password = prompt_new_password(PASSWORD_ENV)?;
    let session = VaultSession::create(&path, password.as_bytes(), Some(params))?;

    output::success(&format!("Vault created at {}", session.path().display()));
    output::info(&format!(
        "Argon2id: time={} memory={} KiB parallelism={}",
        params.time_cost, params.memory_cost, params.parallelism
    ));
    output::tip("Run `passvault add <NAME>` to add an entry.");

    Ok(())
}

//! One module per subcommand, each exposing an `execute` function.

pub mod add;
pub mod auth;
pub mod clear_clipboard;
pub mod completions;
pub mod get;
pub mod init;
pub mod list;
pub mod passwd;
pub mod remove;
pub mod update;

use std::path::Path;

use crate::cli::prompt_password_for_vault;
use crate::errors::Result;
use crate::vault::VaultSession;

/// Prompt for the password (env, keyring, then terminal) and unlock the vault.
pub(crate) fn unlock(path: &Path) -> Result<VaultSession> {
    let password = prompt_password_for_vault(Some(path))?;
    VaultSession::unlock(path, password.as_bytes())
}

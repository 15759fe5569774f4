//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod clipboard;
pub mod commands;
pub mod output;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::crypto::kdf::KdfParams;
use crate::errors::{PassVaultError, Result};

/// Minimum length for a new master password.
const MIN_PASSWORD_LEN: usize = 8;

/// Environment variable read before prompting for the master password.
pub const PASSWORD_ENV: &str = "PASSVAULT_PASSWORD";

/// Environment variable holding the replacement password for `passwd`.
pub const NEW_PASSWORD_ENV: &str = "PASSVAULT_NEW_PASSWORD";

/// PassVault CLI: password-protected secrets vault.
#[derive(Parser)]
#[command(
    name = "passvault",
    about = "Password-protected secrets vault in a single encrypted file",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault file (default: `default_vault` from .passvault.toml)
    #[arg(long, env = "PASSVAULT_VAULT", global = true)]
    pub vault: Option<PathBuf>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create a new, empty vault
    Init {
        #[command(flatten)]
        kdf: KdfArgs,
    },

    /// Add a new entry
    Add {
        /// Entry name (e.g. "Email")
        name: String,
        /// Username for the service
        #[arg(short, long)]
        username: Option<String>,
        /// Secret field as NAME=VALUE (repeatable; prompts for a password if omitted)
        #[arg(short, long = "field", value_name = "NAME=VALUE")]
        fields: Vec<String>,
    },

    /// Show an entry, or a single field of it
    Get {
        /// Entry name
        name: String,
        /// Print only this field
        #[arg(short, long)]
        field: Option<String>,
        /// Copy the field (default: password) to the clipboard instead of printing it
        #[arg(short, long)]
        copy: bool,
    },

    /// List all entries
    List,

    /// Change an existing entry
    Update {
        /// Entry name
        name: String,
        /// New entry name
        #[arg(long)]
        rename: Option<String>,
        /// New username
        #[arg(short, long, conflicts_with = "clear_username")]
        username: Option<String>,
        /// Remove the username
        #[arg(long)]
        clear_username: bool,
        /// Set a field as NAME=VALUE (repeatable)
        #[arg(short, long = "field", value_name = "NAME=VALUE")]
        fields: Vec<String>,
        /// Remove a field (repeatable)
        #[arg(long = "remove-field", value_name = "NAME")]
        remove_fields: Vec<String>,
    },

    /// Remove an entry
    Remove {
        /// Entry name
        name: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Change the vault's master password
    Passwd,

    /// Clear the system clipboard
    ClearClipboard,

    /// Manage authentication methods (keyring)
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Auth subcommands.
#[derive(clap::Subcommand)]
pub enum AuthAction {
    /// Save vault password to OS keyring (auto-unlock)
    Keyring {
        /// Remove password from keyring instead of saving
        #[arg(long)]
        delete: bool,
    },
}

/// KDF overrides, accepted only when a vault is created.
#[derive(clap::Args, Debug, Default)]
pub struct KdfArgs {
    /// Argon2 iterations
    #[arg(long)]
    pub time: Option<u32>,
    /// Argon2 memory in KiB
    #[arg(long)]
    pub memory: Option<u32>,
    /// Argon2 lanes
    #[arg(long)]
    pub parallelism: Option<u32>,
    /// Pick the iteration count so unlocking takes at least this many milliseconds
    #[arg(long, value_name = "MS", conflicts_with = "time")]
    pub calibrate_ms: Option<u64>,
}

impl KdfArgs {
    /// Merge the overrides onto `base` (usually the configured params).
    pub fn resolve(&self, base: KdfParams) -> Result<KdfParams> {
        let mut params = match self.calibrate_ms {
            Some(ms) => KdfParams::calibrate(std::time::Duration::from_millis(ms))?,
            None => base,
        };
        if let Some(t) = self.time {
            params.time_cost = t;
        }
        if let Some(m) = self.memory {
            params.memory_cost = m;
        }
        if let Some(p) = self.parallelism {
            params.parallelism = p;
        }
        params.validate()?;
        Ok(params)
    }
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Get the vault password, trying in order:
/// 1. `PASSVAULT_PASSWORD` env var (scripts)
/// 2. OS keyring (if compiled with `keyring-store` feature)
/// 3. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password_for_vault(vault: Option<&Path>) -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    #[cfg(feature = "keyring-store")]
    if let Some(path) = vault {
        // Keyring unavailable or empty: fall through to the prompt.
        let cached = crate::keyring::CachedPassword::for_vault(path).and_then(|slot| slot.load());
        if let Ok(Some(pw)) = cached {
            return Ok(pw);
        }
    }

    #[cfg(not(feature = "keyring-store"))]
    let _ = vault;

    let pw = dialoguer::Password::new()
        .with_prompt("Enter master password")
        .interact()
        .map_err(|e| PassVaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new password with confirmation (used by `init` and `passwd`).
///
/// Reads `env_var` first for scripted usage (`PASSWORD_ENV` for `init`,
/// `NEW_PASSWORD_ENV` for `passwd`). Enforces a minimum password length.
pub fn prompt_new_password(env_var: &str) -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(env_var) {
        if !pw.is_empty() {
            if pw.len() < MIN_PASSWORD_LEN {
                return Err(PassVaultError::CommandFailed(format!(
                    "password must be at least {MIN_PASSWORD_LEN} characters"
                )));
            }
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose master password")
            .with_confirmation(
                "Confirm master password",
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| PassVaultError::CommandFailed(format!("password prompt: {e}")))?;

        if password.len() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

/// Resolve the vault file: `--vault` / `PASSVAULT_VAULT`, else the
/// configured default relative to the working directory.
pub fn vault_path(cli: &Cli) -> Result<PathBuf> {
    if let Some(path) = &cli.vault {
        return Ok(path.clone());
    }
    let cwd = std::env::current_dir().map_err(|e| PassVaultError::io(".", e))?;
    Ok(Settings::load(&cwd)?.vault_path(&cwd))
}

/// Parse repeated `NAME=VALUE` arguments into a field map.
///
/// Only the first `=` splits, so values may contain `=`.
pub fn parse_fields(raw: &[String]) -> Result<BTreeMap<String, String>> {
    let mut fields = BTreeMap::new();
    for item in raw {
        let (name, value) = item.split_once('=').ok_or_else(|| {
            PassVaultError::CommandFailed(format!("field '{item}' must look like NAME=VALUE"))
        })?;
        fields.insert(name.trim().to_string(), value.to_string());
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_fields_splits_on_first_equals() {
        let fields = parse_fields(&["password=a=b".into(), "pin=1234".into()]).unwrap();
        assert_eq!(fields["password"], "a=b");
        assert_eq!(fields["pin"], "1234");
    }

    #[test]
    fn parse_fields_rejects_missing_equals() {
        assert!(parse_fields(&["password".into()]).is_err());
    }

    #[test]
    fn kdf_args_override_base() {
        let args = KdfArgs {
            time: Some(1),
            memory: Some(8_192),
            parallelism: Some(1),
            calibrate_ms: None,
        };
        let params = args.resolve(KdfParams::default()).unwrap();
        assert_eq!(params, KdfParams::new(1, 8_192, 1));
    }

    #[test]
    fn kdf_args_reject_weak_params() {
        let args = KdfArgs {
            memory: Some(16),
            ..KdfArgs::default()
        };
        assert!(args.resolve(KdfParams::default()).is_err());
    }

    #[test]
    fn explicit_vault_flag_wins() {
        let cli = Cli::parse_from(["passvault", "--vault", "/tmp/x.vault", "list"]);
        assert_eq!(vault_path(&cli).unwrap(), PathBuf::from("/tmp/x.vault"));
    }
}

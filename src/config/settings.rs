use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::KdfParams;
use crate::errors::{PassVaultError, Result};

/// User-level configuration, loaded from `.passvault.toml`.
///
/// Every field has a sensible default so PassVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Vault file used when `--vault` is not given.
    #[serde(default = "default_vault")]
    pub default_vault: String,

    /// Argon2 iteration count for new vaults (default: 3).
    #[serde(default = "default_kdf_time_cost")]
    pub kdf_time_cost: u32,

    /// Argon2 memory cost in KiB for new vaults (default: 64 MB).
    #[serde(default = "default_kdf_memory_kib")]
    pub kdf_memory_kib: u32,

    /// Argon2 parallelism for new vaults (default: 4).
    #[serde(default = "default_kdf_parallelism")]
    pub kdf_parallelism: u32,

    /// Append logs to this file instead of stderr.
    #[serde(default)]
    pub log_file: Option<String>,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault() -> String {
    "passvault.vault".to_string()
}

fn default_kdf_time_cost() -> u32 {
    KdfParams::default().time_cost
}

fn default_kdf_memory_kib() -> u32 {
    KdfParams::default().memory_cost
}

fn default_kdf_parallelism() -> u32 {
    KdfParams::default().parallelism
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_vault: default_vault(),
            kdf_time_cost: default_kdf_time_cost(),
            kdf_memory_kib: default_kdf_memory_kib(),
            kdf_parallelism: default_kdf_parallelism(),
            log_file: None,
        }
    }
}

impl Settings {
    /// Name of the config file we look for.
    pub const FILE_NAME: &'static str = ".passvault.toml";

    /// Load settings from `<dir>/.passvault.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)
            .map_err(|e| PassVaultError::io(&config_path, e))?;

        toml::from_str(&contents).map_err(|e| {
            PassVaultError::Config(format!("Failed to parse {}: {e}", config_path.display()))
        })
    }

    /// Resolve the default vault file relative to `dir`.
    ///
    /// Absolute `default_vault` values are returned unchanged.
    pub fn vault_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.default_vault)
    }

    /// KDF parameters for newly created vaults.
    pub fn kdf_params(&self) -> KdfParams {
        KdfParams {
            time_cost: self.kdf_time_cost,
            memory_cost: self.kdf_memory_kib,
            parallelism: self.kdf_parallelism,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

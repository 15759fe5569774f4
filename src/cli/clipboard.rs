//! System clipboard access for `get --copy` and `clear-clipboard`.
//!
//! Nothing clears the clipboard automatically; the user runs
//! `passvault clear-clipboard` when done.

use crate::errors::{PassVaultError, Result};

fn clipboard() -> Result<arboard::Clipboard> {
    arboard::Clipboard::new()
        .map_err(|e| PassVaultError::Clipboard(format!("clipboard unavailable: {e}")))
}

/// Put `text` on the system clipboard.
pub fn copy(text: &str) -> Result<()> {
    clipboard()?
        .set_text(text.to_string())
        .map_err(|e| PassVaultError::Clipboard(format!("failed to copy: {e}")))
}

/// Empty the system clipboard.
pub fn clear() -> Result<()> {
    clipboard()?
        .clear()
        .map_err(|e| PassVaultError::Clipboard(format!("failed to clear: {e}")))
}

//! `passvault get`: show an entry, print one field, or copy it.

use crate::cli::{clipboard, output, vault_path, Cli};
use crate::errors::{PassVaultError, Result};

/// Field copied by `--copy` when `--field` is not given.
const DEFAULT_COPY_FIELD: &str = "password";

/// Execute the `get` command.
pub fn execute(cli: &Cli, name: &str, field: Option<&str>, copy: bool) -> Result<()> {
    let path = vault_path(cli)?;
    let session = super::unlock(&path)?;
    let entry = session.get_entry(name)?;

    if field.is_none() && !copy {
        output::print_entry(entry);
        return Ok(());
    }

    let field = field.unwrap_or(DEFAULT_COPY_FIELD);
    let value = entry
        .field(field)
        .ok_or_else(|| PassVaultError::EntryNotFound(format!("{name}/{field}")))?;

    if copy {
        clipboard::copy(value)?;
        output::success(&format!("Copied '{field}' of '{name}' to the clipboard."));
        output::tip("Run `passvault clear-clipboard` when you are done.");
    } else {
        println!("{value}");
    }

    Ok(())
}

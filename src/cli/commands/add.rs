//! `passvault add`: add a new entry to the vault.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{parse_fields, vault_path, Cli};
use crate::errors::{PassVaultError, Result};

/// Field filled in when no `--field` is given.
const DEFAULT_FIELD: &str = "password";

/// Execute the `add` command.
pub fn execute(
    cli: &Cli,
    name: &str,
    username: Option<&str>,
    raw_fields: &[String],
) -> Result<()> {
    let path = vault_path(cli)?;

    let mut fields = parse_fields(raw_fields)?;
    if fields.is_empty() {
        fields.insert(DEFAULT_FIELD.to_string(), read_secret(name)?.to_string());
    } else {
        output::warning("Values provided on command line: they may appear in shell history.");
    }

    let mut session = super::unlock(&path)?;
    session.add_entry(name, username, fields)?;
    session.save()?;

    output::success(&format!(
        "Entry '{name}' added ({} total)",
        session.entry_count()?
    ));
    Ok(())
}

/// Read the default field from piped stdin or a hidden prompt.
fn read_secret(name: &str) -> Result<Zeroizing<String>> {
    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| PassVaultError::io("<stdin>", e))?;
        let trimmed = buf.trim_end().len();
        buf.truncate(trimmed);
        return Ok(buf);
    }

    let value = dialoguer::Password::new()
        .with_prompt(format!("Enter {DEFAULT_FIELD} for {name}"))
        .interact()
        .map_err(|e| PassVaultError::CommandFailed(format!("input prompt: {e}")))?;
    Ok(Zeroizing::new(value))
}

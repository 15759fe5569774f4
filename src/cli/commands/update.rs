//! `passvault update`: change an entry's name, username or fields.

use crate::cli::output;
use crate::cli::{parse_fields, vault_path, Cli};
use crate::errors::{PassVaultError, Result};
use crate::vault::EntryUpdate;

/// Flags of the `update` command, grouped for [`execute`].
pub struct UpdateArgs<'a> {
    pub rename: Option<&'a str>,
    pub username: Option<&'a str>,
    pub clear_username: bool,
    pub fields: &'a [String],
    pub remove_fields: &'a [String],
}

/// Turn the command-line flags into an [`EntryUpdate`].
fn build_update(args: &UpdateArgs<'_>) -> Result<EntryUpdate> {
    let mut update = EntryUpdate::new();
    if let Some(name) = args.rename {
        update = update.rename(name);
    }
    if let Some(username) = args.username {
        update = update.username(username);
    }
    if args.clear_username {
        update = update.clear_username();
    }
    for (name, value) in parse_fields(args.fields)? {
        update = update.set_field(name, value);
    }
    for name in args.remove_fields {
        update = update.remove_field(name.as_str());
    }

    if update.is_empty() {
        return Err(PassVaultError::CommandFailed(
            "nothing to update; pass --rename, --username, --field or --remove-field".into(),
        ));
    }
    Ok(update)
}

/// Execute the `update` command.
pub fn execute(cli: &Cli, name: &str, args: &UpdateArgs<'_>) -> Result<()> {
    let update = build_update(args)?;
    let path = vault_path(cli)?;

    let mut session = super::unlock(&path)?;
    session.update_entry(name, update)?;
    session.save()?;

    output::success(&format!("Entry '{}' updated", args.rename.unwrap_or(name)));
    Ok(())
}

//! `passvault list`: display all entries in a table.

use crate::cli::output;
use crate::cli::{vault_path, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let path = vault_path(cli)?;
    let session = super::unlock(&path)?;

    let entries = session.list_entries()?;
    output::info(&format!(
        "{}: {} entr{}",
        path.display(),
        entries.len(),
        if entries.len() == 1 { "y" } else { "ies" }
    ));
    output::print_entries_table(&entries);

    Ok(())
}

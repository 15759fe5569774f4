//! `passvault clear-clipboard`: wipe whatever `get --copy` left behind.

use crate::cli::{clipboard, output};
use crate::errors::Result;

/// Execute the `clear-clipboard` command.
pub fn execute() -> Result<()> {
    clipboard::clear()?;
    output::success("Clipboard cleared.");
    Ok(())
}

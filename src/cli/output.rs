//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::{Entry, EntryMetadata};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of entry metadata (Name, Username, Fields, Updated).
/// Field values never appear here.
pub fn print_entries_table(entries: &[EntryMetadata]) {
    if entries.is_empty() {
        info("No entries in this vault yet.");
        tip("Run `passvault add <NAME>` to add your first entry.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Username", "Fields", "Updated"]);

    for e in entries {
        table.add_row(vec![
            e.name.clone(),
            e.username.clone().unwrap_or_default(),
            e.field_names.join(", "),
            e.updated_at.format(TIME_FORMAT).to_string(),
        ]);
    }

    println!("{table}");
}

/// Print one entry with all of its field values.
pub fn print_entry(entry: &Entry) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec!["name".to_string(), entry.name.clone()]);
    if let Some(username) = &entry.username {
        table.add_row(vec!["username".to_string(), username.clone()]);
    }
    for (name, value) in &entry.fields {
        table.add_row(vec![name.clone(), value.clone()]);
    }
    table.add_row(vec![
        "created".to_string(),
        entry.created_at.format(TIME_FORMAT).to_string(),
    ]);
    table.add_row(vec![
        "updated".to_string(),
        entry.updated_at.format(TIME_FORMAT).to_string(),
    ]);

    println!("{table}");
}

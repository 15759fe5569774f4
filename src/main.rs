use std::path::PathBuf;

use clap::Parser;
use passvault::cli::commands;
use passvault::cli::commands::update::UpdateArgs;
use passvault::cli::{AuthAction, Cli, Commands};
use passvault::config::Settings;

/// Install logging from `.passvault.toml` in the working directory.
/// A broken config is reported by the command itself, so it is ignored here.
fn init_logging() {
    let log_file = std::env::current_dir()
        .ok()
        .and_then(|cwd| Settings::load(&cwd).ok())
        .and_then(|settings| settings.log_file)
        .map(PathBuf::from);

    if let Err(e) = passvault::logging::init(log_file.as_deref()) {
        passvault::cli::output::warning(&format!("logging disabled: {e}"));
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Commands::Init { ref kdf } => commands::init::execute(&cli, kdf),
        Commands::Add {
            ref name,
            ref username,
            ref fields,
        } => commands::add::execute(&cli, name, username.as_deref(), fields),
        Commands::Get {
            ref name,
            ref field,
            copy,
        } => commands::get::execute(&cli, name, field.as_deref(), copy),
        Commands::List => commands::list::execute(&cli),
        Commands::Update {
            ref name,
            ref rename,
            ref username,
            clear_username,
            ref fields,
            ref remove_fields,
        } => commands::update::execute(
            &cli,
            name,
            &UpdateArgs {
                rename: rename.as_deref(),
                username: username.as_deref(),
                clear_username,
                fields,
                remove_fields,
            },
        ),
        Commands::Remove { ref name, force } => commands::remove::execute(&cli, name, force),
        Commands::Passwd => commands::passwd::execute(&cli),
        Commands::ClearClipboard => commands::clear_clipboard::execute(),
        Commands::Auth { ref action } => match action {
            AuthAction::Keyring { delete } => commands::auth::execute_keyring(&cli, *delete),
        },
        Commands::Completions { shell } => commands::completions::execute(shell),
    };

    if let Err(e) = result {
        passvault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

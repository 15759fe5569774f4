//! `passvault completions`: print a shell completion script to stdout.
//!
//!   passvault completions bash > ~/.bash_completion.d/passvault

use std::io;

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::errors::Result;

/// Execute the `completions` command.
pub fn execute(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use clap_complete::Shell;

    use crate::cli::{Cli, Commands};

    fn parsed_shell(arg: &str) -> Option<Shell> {
        match Cli::try_parse_from(["passvault", "completions", arg]).ok()?.command {
            Commands::Completions { shell } => Some(shell),
            _ => None,
        }
    }

    #[test]
    fn shell_names_parse() {
        assert_eq!(parsed_shell("bash"), Some(Shell::Bash));
        assert_eq!(parsed_shell("zsh"), Some(Shell::Zsh));
        assert_eq!(parsed_shell("fish"), Some(Shell::Fish));
        assert_eq!(parsed_shell("powershell"), Some(Shell::PowerShell));
    }

    #[test]
    fn unknown_shell_is_a_usage_error() {
        assert_eq!(parsed_shell("csh"), None);
    }
}

//! cli::commands::completion
//!
//! Completion scripts; runs before any config or network access.

use anyhow::Result;
use clap::CommandFactory;

use crate::cli::args::{Cli, Shell};

impl From<Shell> for clap_complete::Shell {
    fn from(shell: Shell) -> Self {
        match shell {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
        }
    }
}

/// Write the completion script for `shell` to stdout.
pub fn completion(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let bin = cmd.get_name().to_string();
    let mut out = std::io::stdout().lock();
    clap_complete::generate(clap_complete::Shell::from(shell), &mut cmd, bin, &mut out);
    Ok(())
}

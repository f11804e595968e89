//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--interactive` / `--no-interactive`: Control prompts
//! - `--quiet` / `-q`: Minimal output

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Argus - command-line client for the Argus platform
#[derive(Parser, Debug)]
#[command(name = "argus")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if argus was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; implies --no-interactive
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable interactive prompts
    #[arg(long = "interactive", global = true, conflicts_with = "no_interactive")]
    pub interactive_flag: bool,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_interactive: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Determine if interactive mode is enabled.
    ///
    /// Returns true if:
    /// - `--interactive` was explicitly set, OR
    /// - Neither `--no-interactive` nor `--quiet` was set, the settings
    ///   allow it, AND stdin is a TTY
    pub fn interactive(&self, configured: bool) -> bool {
        if self.interactive_flag {
            true
        } else if self.no_interactive || self.quiet {
            false
        } else {
            configured && std::io::stdin().is_terminal()
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the current login, organization, and project
    #[command(
        long_about = "Show the current login, organization, and project.\n\n\
            When run inside a git repository that is linked to a project, the \
            project is shown as well.",
        after_help = "\
EXAMPLES:
    argus status"
    )]
    Status,

    /// Log in with an API token
    #[command(
        long_about = "Log in with an API token.\n\n\
            The token is verified against the server before it is stored. \
            Without --token, the token is read from the terminal without echo.",
        after_help = "\
EXAMPLES:
    # Prompt for the token
    argus login

    # Non-interactive
    argus login --token $ARGUS_TOKEN"
    )]
    Login {
        /// API token (prompted for when omitted)
        #[arg(long, env = "ARGUS_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },

    /// Remove the stored credential
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Manage organizations
    #[command(subcommand)]
    Org(OrgAction),

    /// Manage projects
    #[command(subcommand)]
    Project(ProjectAction),

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Organization subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum OrgAction {
    /// List organizations you belong to
    List,
    /// Select the current organization
    Switch,
    /// Create an organization and select it
    Create {
        /// Organization name (prompted for when omitted)
        #[arg(long)]
        name: Option<String>,
    },
}

/// Project subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ProjectAction {
    /// List projects in the current organization
    List,
    /// Select the current project
    Switch,
    /// Create a project for the current git repository
    #[command(after_help = "\
EXAMPLES:
    # Name defaults to the repository (or subdirectory) name
    argus project create

    argus project create --name billing")]
    Create {
        /// Project name (prompted for when omitted)
        #[arg(long)]
        name: Option<String>,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

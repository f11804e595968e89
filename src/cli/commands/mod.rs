//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Declares the [`SetupRequest`](crate::setup::SetupRequest) it needs and
//!    resolves it through the session
//! 2. Calls the API or a create/switch handler
//! 3. Saves any new selection and prints the result
//!
//! Handlers are async; `cli::run` drives them on a tokio runtime.

mod auth;
mod completion;
mod org;
mod project;
mod status;

pub use auth::{login, logout, whoami};
pub use completion::completion;
pub use status::status;

use crate::cli::args::Command;
use crate::cli::session::Session;
use crate::core::context::Context;
use anyhow::Result;

/// Dispatch a command to its handler.
pub async fn dispatch(ctx: &Context, session: &Session, command: Command) -> Result<()> {
    match command {
        Command::Status => status(ctx, session).await,
        Command::Login { token } => login(ctx, session, token).await,
        Command::Logout => logout(session),
        Command::Whoami => whoami(ctx, session).await,
        Command::Org(action) => org::run(ctx, session, action).await,
        Command::Project(action) => project::run(ctx, session, action).await,
        Command::Completion { shell } => completion(shell),
    }
}

//! cli
//!
//! Command-line interface layer for Argus.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Initialise logging and wire Ctrl-C to cancellation
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap, builds a
//! [`Session`] and dispatches to the command handlers, which resolve their
//! context through [`crate::setup`] before doing any work.

pub mod args;
pub mod commands;
pub mod session;

pub use args::{Cli, Command, Shell};
pub use session::Session;

use std::time::Duration;

use anyhow::Result;

use crate::api::{ApiError, TransportError};
use crate::core::context::{Context, ContextError};
use crate::logging;
use crate::setup::SetupError;

/// How long to wait for a blocked stdin read after the command finishes.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(100);

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    logging::init(cli.debug);

    if let Command::Completion { shell } = cli.command {
        return commands::completion(shell);
    }

    let session = Session::from_cli(&cli)?;

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(async {
        let (ctx, cancel) = Context::with_cancel();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::debug!("interrupt received");
                cancel.cancel();
            }
        });
        commands::dispatch(&ctx, &session, cli.command).await
    });
    // A prompt may still be parked on stdin
    rt.shutdown_timeout(SHUTDOWN_GRACE);
    result
}

/// Whether `err` means the command was interrupted rather than failing.
pub fn is_interrupted(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause.is::<ContextError>()
            || cause.downcast_ref::<SetupError>().is_some_and(SetupError::is_canceled)
            || cause.downcast_ref::<ApiError>().is_some_and(ApiError::is_canceled)
            || cause
                .downcast_ref::<TransportError>()
                .is_some_and(TransportError::is_canceled)
    })
}

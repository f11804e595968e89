//! Argus - command-line client for the Argus platform
//!
//! Before any subcommand runs, Argus establishes a consistent command
//! context: which user is authenticated, and which organization and project
//! are in scope. It combines the locally persisted state, the current git
//! working directory, and calls to the Argus API.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, resolves context, runs commands)
//! - [`setup`] - Command-state resolver (login → invitations → repo lookup → org → project)
//! - [`api`] - Typed API client over a retrying, authenticated HTTP transport
//! - [`core`] - Persisted config, settings, and the cancellation context
//! - [`git`] - Repository introspection
//! - [`ui`] - Prompts and output
//! - [`logging`] - Tracing subscriber setup
//!
//! # Invariants
//!
//! 1. Auth failures are never retried
//! 2. Cancellation wins over retrying, sleeping, and prompting
//! 3. Selections are saved only when resolution succeeds; a repo lookup match
//!    is remembered as soon as it is found
//! 4. A repo maps to a known project only on an exact (remote, subdirectory) match

pub mod api;
pub mod cli;
pub mod core;
pub mod git;
pub mod logging;
pub mod setup;
pub mod ui;

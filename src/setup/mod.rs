//! setup
//!
//! Command-state resolution.
//!
//! # Architecture
//!
//! Each command declares a [`SetupRequest`]: whether it needs a login and
//! how much it needs to know about the organization and project. The
//! [`Resolver`] combines that request with the persisted [`Config`], the
//! current git repo, and the API to produce a [`CommandState`], checking
//! cheap local state (known repos, stored IDs) before any remote call and
//! prompting only when the answer is genuinely ambiguous.
//!
//! # Modules
//!
//! - `requirements`: [`SetupRequest`] and requirement levels
//! - `state`: [`CommandState`]
//! - `handlers`: interactive create/select collaborators
//! - `resolver`: the resolution procedure
//! - `errors`: [`SetupError`]
//!
//! [`Config`]: crate::core::config::Config

mod errors;
pub mod handlers;
mod requirements;
mod resolver;
mod state;

pub use errors::SetupError;
pub use handlers::{CreateFlags, EntityHandler, HandlerError, Handlers};
pub use requirements::{EntityKind, LoginRequirement, Requirement, SetupRequest};
pub use resolver::{Resolved, Resolver};
pub use state::CommandState;

//! setup::errors
//!
//! Error types for command-state resolution.

use thiserror::Error;

use super::handlers::HandlerError;
use super::requirements::EntityKind;
use crate::api::ApiError;
use crate::core::config::ConfigError;
use crate::core::context::ContextError;
use crate::ui::prompts::PromptError;

/// Errors from [`Resolver::resolve`](super::Resolver::resolve).
#[derive(Debug, Error)]
pub enum SetupError {
    /// The command needs a login and the stored credential is missing or expired.
    #[error("not logged in, run `argus login` first")]
    NotLoggedIn,

    /// The repo lookup needs a login.
    #[error("not logged in, can't lookup project from git repo")]
    NotLoggedInForRepoLookup,

    /// The repo lookup matched a project without naming its organization.
    #[error("project {project} found for this repository has no organization")]
    LookupWithoutOrganization { project: String },

    #[error("organization already exists: {id}")]
    OrganizationExists { id: String },

    #[error("project already exists: {id}")]
    ProjectExists { id: String },

    /// The user declined creating a missing entity, or creation was impossible.
    #[error("{kind} creation canceled")]
    CreationCanceled { kind: EntityKind },

    /// The user rejected the offered entity.
    #[error("{kind} selection canceled")]
    SelectionCanceled { kind: EntityKind },

    /// An existing entity was required and there is none.
    #[error("no {kind}s available")]
    NoneAvailable { kind: EntityKind },

    /// A project is needed but no organization is selected.
    #[error("no organization selected, run `argus org switch` first")]
    NoOrganizationSelected,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Handler(#[from] HandlerError),

    /// Resolution succeeded but the result could not be persisted.
    #[error("failed to save config after setup")]
    SaveConfig(#[source] ConfigError),

    #[error(transparent)]
    Context(#[from] ContextError),
}

impl SetupError {
    /// The command was interrupted rather than failing.
    pub fn is_canceled(&self) -> bool {
        match self {
            SetupError::Context(_) => true,
            SetupError::Api(err) => err.is_canceled(),
            SetupError::Prompt(err) => matches!(err, PromptError::Context(_)),
            SetupError::Handler(err) => err.is_canceled(),
            _ => false,
        }
    }

    /// The server rejected the stored credential.
    pub fn is_auth(&self) -> bool {
        match self {
            SetupError::Api(err) => err.is_auth(),
            SetupError::Handler(HandlerError::Api(err)) => err.is_auth(),
            _ => false,
        }
    }
}

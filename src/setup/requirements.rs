//! setup::requirements
//!
//! What a command needs resolved before it runs.

use std::fmt;

/// Whether the command needs a logged-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginRequirement {
    #[default]
    Ignore,
    NeedLogin,
}

/// How an organization or project must be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Requirement {
    /// Not needed; nothing is resolved.
    #[default]
    Ignore,
    /// Full record; offer to create one if none exists.
    NeedData,
    /// Only the ID; offer to create one if none exists.
    NeedIdOnly,
    /// Full record of an existing entity; never created.
    NeedExistingData,
    /// ID of an existing entity; never created.
    NeedExistingIdOnly,
    /// Only what the current git repo maps to, if anything.
    NeedRepoLookup,
    /// Must not be selected yet.
    MustNotExist,
}

impl Requirement {
    /// Satisfied by a known ID without a network call.
    pub fn is_id_only(self) -> bool {
        matches!(self, Requirement::NeedIdOnly | Requirement::NeedExistingIdOnly)
    }

    /// Only existing entities may be chosen.
    pub fn is_existing_only(self) -> bool {
        matches!(
            self,
            Requirement::NeedExistingData | Requirement::NeedExistingIdOnly
        )
    }

    /// Satisfied without any network call given whether an ID is known.
    pub(crate) fn satisfied_by_id(self, has_id: bool) -> bool {
        match self {
            Requirement::Ignore => true,
            Requirement::NeedIdOnly | Requirement::NeedExistingIdOnly => has_id,
            Requirement::NeedData
            | Requirement::NeedExistingData
            | Requirement::NeedRepoLookup
            | Requirement::MustNotExist => false,
        }
    }
}

/// Per-command resolution request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SetupRequest {
    pub login: LoginRequirement,
    pub organization: Requirement,
    pub project: Requirement,
}

impl SetupRequest {
    /// Nothing required.
    pub const NONE: SetupRequest = SetupRequest {
        login: LoginRequirement::Ignore,
        organization: Requirement::Ignore,
        project: Requirement::Ignore,
    };

    pub const fn new(
        login: LoginRequirement,
        organization: Requirement,
        project: Requirement,
    ) -> Self {
        Self {
            login,
            organization,
            project,
        }
    }

    /// Login only.
    pub const fn login() -> Self {
        Self::new(
            LoginRequirement::NeedLogin,
            Requirement::Ignore,
            Requirement::Ignore,
        )
    }

    /// Whether the repo-based project lookup applies: an explicit
    /// `NeedRepoLookup`, or any project requirement at all.
    pub(crate) fn wants_repo_lookup(&self) -> bool {
        self.organization == Requirement::NeedRepoLookup || self.project != Requirement::Ignore
    }
}

/// The kind of entity being resolved, for prompts and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Organization,
    Project,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Organization => "organization",
            EntityKind::Project => "project",
        })
    }
}

impl EntityKind {
    /// "an organization" / "a project".
    pub fn with_article(self) -> &'static str {
        match self {
            EntityKind::Organization => "an organization",
            EntityKind::Project => "a project",
        }
    }
}

//! core::config::schema
//!
//! Persisted state schema.
//!
//! # Layout
//!
//! ```json
//! {
//!   "organizationId": "org_123",
//!   "projectId": "prj_456",
//!   "credential": {
//!     "token": "…",
//!     "tokenExpiresAt": "2026-11-01T12:00:00Z",
//!     "userId": "usr_1",
//!     "name": "Ada",
//!     "email": "ada@example.com"
//!   },
//!   "knownProjects": [
//!     {
//!       "repoUrl": "git@github.com:acme/api.git",
//!       "repoPath": "services/billing",
//!       "organizationId": "org_123",
//!       "projectId": "prj_456",
//!       "projectName": "billing"
//!     }
//!   ]
//! }
//! ```
//!
//! The `repo` snapshot on [`Config`] is never serialized; it is recomputed
//! from the working tree on every invocation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted client state plus the per-process repo snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Currently selected organization.
    pub organization_id: String,

    /// Currently selected project.
    pub project_id: String,

    /// Login credential.
    pub credential: Credential,

    /// Repo → project memo.
    pub known_projects: Vec<KnownProject>,

    /// Transient working-tree snapshot. Never persisted.
    #[serde(skip)]
    pub repo: RepoSnapshot,
}

/// Transient facts about the current working tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoSnapshot {
    /// The working tree maps to a known project.
    pub known: bool,
    /// Remote URL of the current repository (empty outside a repo).
    pub url: String,
    /// Subdirectory of the working tree root (empty at the root).
    pub path: String,
    /// Name of the project the working tree maps to.
    pub project_name: String,
}

impl RepoSnapshot {
    /// Whether the working tree is a repository with a remote.
    pub fn in_repo(&self) -> bool {
        !self.url.is_empty()
    }
}

/// Authentication credential obtained by `argus login`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Credential {
    pub token: String,
    pub token_expires_at: Option<DateTime<Utc>>,
    pub user_id: String,
    pub name: String,
    pub email: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("has_token", &!self.token.is_empty())
            .field("token_expires_at", &self.token_expires_at)
            .field("user_id", &self.user_id)
            .field("name", &self.name)
            .field("email", &self.email)
            .finish()
    }
}

impl Credential {
    /// A token is usable iff it is non-empty and unexpired at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.token.is_empty() && self.token_expires_at.is_some_and(|expires| now < expires)
    }

    /// [`is_valid_at`](Self::is_valid_at) against the wall clock.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }
}

/// A memo linking a git remote + subdirectory to a resolved project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KnownProject {
    pub repo_url: String,
    pub repo_path: String,
    pub organization_id: String,
    pub project_id: String,
    pub project_name: String,
}

impl KnownProject {
    /// Exact-pair match; no prefix matching on the path.
    pub fn matches(&self, repo_url: &str, repo_path: &str) -> bool {
        self.repo_url == repo_url && self.repo_path == repo_path
    }
}

impl Config {
    /// Find the known project for an exact `(repo_url, repo_path)` pair.
    pub fn find_known_project(&self, repo_url: &str, repo_path: &str) -> Option<&KnownProject> {
        self.known_projects
            .iter()
            .find(|known| known.matches(repo_url, repo_path))
    }

    /// Record a repo → project link, replacing any entry for the same pair.
    pub fn add_known_project(
        &mut self,
        project_id: impl Into<String>,
        project_name: impl Into<String>,
        organization_id: impl Into<String>,
        repo_url: impl Into<String>,
        repo_path: impl Into<String>,
    ) {
        let entry = KnownProject {
            repo_url: repo_url.into(),
            repo_path: repo_path.into(),
            organization_id: organization_id.into(),
            project_id: project_id.into(),
            project_name: project_name.into(),
        };
        self.known_projects
            .retain(|known| !known.matches(&entry.repo_url, &entry.repo_path));
        self.known_projects.push(entry);
    }

    /// Drop the link for `(repo_url, repo_path)`, if any.
    pub fn remove_known_project(&mut self, repo_url: &str, repo_path: &str) {
        self.known_projects
            .retain(|known| !known.matches(repo_url, repo_path));
    }

    /// Clear the credential (logout).
    pub fn clear_credential(&mut self) {
        self.credential = Credential::default();
    }
}

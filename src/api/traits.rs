//! api::traits
//!
//! The [`ArgusApi`] trait and the records it exchanges.
//!
//! # Design
//!
//! One method per remote operation. Implementations validate required
//! parameters before any network call, delegate to the transport, unwrap the
//! response envelope, and wrap failures with the operation that failed.
//! No retries or branching happen at this layer.
//!
//! # Error Handling
//!
//! All methods return `Result<T, ApiError>`. Callers should handle:
//! - `MissingField`: a required ID was empty (no request was sent)
//! - `Request` with an auth source: the session is no longer valid
//! - `Request` with a cancellation source: the command was interrupted

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::transport::TransportError;
use crate::core::context::Context;

/// Remote operations, used in error messages and by the mock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetUser,
    ListOrganizationInvitations,
    AcceptOrganizationInvitation,
    ListOrganizations,
    GetOrganization,
    CreateOrganization,
    ListProjects,
    GetProject,
    CreateProject,
    FindProjectByRepo,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Operation::GetUser => "get user",
            Operation::ListOrganizationInvitations => "list organization invitations",
            Operation::AcceptOrganizationInvitation => "accept organization invitation",
            Operation::ListOrganizations => "list organizations",
            Operation::GetOrganization => "get organization",
            Operation::CreateOrganization => "create organization",
            Operation::ListProjects => "list projects",
            Operation::GetProject => "get project",
            Operation::CreateProject => "create project",
            Operation::FindProjectByRepo => "look up project by git repo",
        };
        f.write_str(text)
    }
}

/// Errors from domain client operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required parameter was empty; nothing was sent.
    #[error("missing {0}")]
    MissingField(&'static str),

    /// The transport failed for `operation`.
    #[error("failed to {operation}")]
    Request {
        operation: Operation,
        #[source]
        source: TransportError,
    },
}

impl ApiError {
    /// Wrap a transport error with the operation that produced it.
    pub fn request(operation: Operation) -> impl FnOnce(TransportError) -> ApiError {
        move |source| ApiError::Request { operation, source }
    }

    /// The underlying transport error, if any.
    pub fn transport(&self) -> Option<&TransportError> {
        match self {
            ApiError::Request { source, .. } => Some(source),
            ApiError::MissingField(_) => None,
        }
    }

    /// 401/403 from the server.
    pub fn is_auth(&self) -> bool {
        self.transport().is_some_and(TransportError::is_auth)
    }

    /// The caller's context was cancelled.
    pub fn is_canceled(&self) -> bool {
        self.transport().is_some_and(TransportError::is_canceled)
    }

    /// The response had no `data` field.
    pub fn is_missing_data(&self) -> bool {
        self.transport().is_some_and(TransportError::is_missing_data)
    }
}

/// Reject empty required parameters.
pub fn require(value: &str, field: &'static str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        Err(ApiError::MissingField(field))
    } else {
        Ok(())
    }
}

/// The authenticated user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// An organization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub slug: String,
}

impl std::fmt::Display for Organization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.slug.is_empty() || self.slug == self.name {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} ({})", self.name, self.slug)
        }
    }
}

/// A project inside an organization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub org_id: String,
}

impl std::fmt::Display for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.slug.is_empty() || self.slug == self.name {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} ({})", self.name, self.slug)
        }
    }
}

/// A pending invitation to join an organization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrganizationInvitation {
    pub id: String,
    pub organization_id: String,
    pub organization_name: String,
    pub invited_by: String,
}

/// Body of `create_organization`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizationRequest {
    pub name: String,
}

/// Body of `create_project`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: String,
    /// Git remote the project is linked to (empty for none).
    pub repo_url: String,
    /// Subdirectory within the repo.
    pub repo_path: String,
}

/// Typed access to the Argus API.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
#[async_trait]
pub trait ArgusApi: Send + Sync {
    /// Fetch the user the current token belongs to.
    async fn get_user(&self, ctx: &Context) -> Result<User, ApiError>;

    /// List pending organization invitations for the current user.
    async fn list_organization_invitations(
        &self,
        ctx: &Context,
    ) -> Result<Vec<OrganizationInvitation>, ApiError>;

    /// Accept an invitation. Not deduplicated if retried.
    async fn accept_organization_invitation(
        &self,
        ctx: &Context,
        invitation_id: &str,
    ) -> Result<(), ApiError>;

    /// List organizations the user belongs to.
    async fn list_organizations(&self, ctx: &Context) -> Result<Vec<Organization>, ApiError>;

    /// Fetch one organization by ID.
    async fn get_organization(
        &self,
        ctx: &Context,
        organization_id: &str,
    ) -> Result<Organization, ApiError>;

    /// Create an organization.
    async fn create_organization(
        &self,
        ctx: &Context,
        request: &CreateOrganizationRequest,
    ) -> Result<Organization, ApiError>;

    /// List projects of an organization.
    async fn list_projects(
        &self,
        ctx: &Context,
        organization_id: &str,
    ) -> Result<Vec<Project>, ApiError>;

    /// Fetch one project by ID.
    async fn get_project(
        &self,
        ctx: &Context,
        organization_id: &str,
        project_id: &str,
    ) -> Result<Project, ApiError>;

    /// Create a project in an organization.
    async fn create_project(
        &self,
        ctx: &Context,
        organization_id: &str,
        request: &CreateProjectRequest,
    ) -> Result<Project, ApiError>;

    /// Find the project linked to a git remote + subdirectory.
    ///
    /// `Ok(None)` means no project is linked yet; that is not an error.
    async fn find_project_by_repo(
        &self,
        ctx: &Context,
        repo_url: &str,
        repo_path: &str,
    ) -> Result<Option<Project>, ApiError>;
}

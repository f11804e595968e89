//! api::mock
//!
//! Mock API implementation for deterministic testing.
//!
//! # Design
//!
//! The mock stores users, organizations, projects, invitations and repo links
//! in memory, records every call, and can be configured to fail specific
//! operations.
//!
//! # Example
//!
//! ```
//! use argus::api::mock::MockApi;
//! use argus::api::{ArgusApi, Organization};
//! use argus::core::context::Context;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let api = MockApi::new().with_organization(Organization {
//!     id: "org_1".into(),
//!     name: "Acme".into(),
//!     slug: "acme".into(),
//! });
//!
//! let orgs = api.list_organizations(&Context::background()).await.unwrap();
//! assert_eq!(orgs.len(), 1);
//! # });
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::traits::{
    require, ApiError, ArgusApi, CreateOrganizationRequest, CreateProjectRequest, Operation,
    Organization, OrganizationInvitation, Project, User,
};
use super::transport::TransportError;
use crate::core::context::Context;

/// Mock API for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockApi {
    inner: Arc<Mutex<MockApiInner>>,
}

#[derive(Debug, Default)]
struct MockApiInner {
    user: Option<User>,
    invitations: Vec<OrganizationInvitation>,
    organizations: Vec<Organization>,
    projects: Vec<Project>,
    /// (repo_url, repo_path) → project ID
    repo_links: HashMap<(String, String), String>,
    fail_on: HashMap<Operation, TransportError>,
    calls: Vec<MockCall>,
    next_id: u64,
}

/// A recorded call: the operation and its string arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub operation: Operation,
    pub args: Vec<String>,
}

impl MockApi {
    /// Create an empty mock with no user.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the user returned by `get_user`.
    pub fn with_user(self, user: User) -> Self {
        self.lock().user = Some(user);
        self
    }

    /// Add a pending invitation.
    pub fn with_invitation(self, invitation: OrganizationInvitation) -> Self {
        self.lock().invitations.push(invitation);
        self
    }

    /// Add an organization.
    pub fn with_organization(self, organization: Organization) -> Self {
        self.lock().organizations.push(organization);
        self
    }

    /// Add a project.
    pub fn with_project(self, project: Project) -> Self {
        self.lock().projects.push(project);
        self
    }

    /// Link a repo location to an existing project ID.
    pub fn with_repo_link(
        self,
        repo_url: impl Into<String>,
        repo_path: impl Into<String>,
        project_id: impl Into<String>,
    ) -> Self {
        self.lock()
            .repo_links
            .insert((repo_url.into(), repo_path.into()), project_id.into());
        self
    }

    /// Configure `operation` to fail with `error`.
    pub fn fail_on(self, operation: Operation, error: TransportError) -> Self {
        self.lock().fail_on.insert(operation, error);
        self
    }

    /// Clear all failure configuration.
    pub fn clear_fail_on(&self) {
        self.lock().fail_on.clear();
    }

    /// Get all recorded calls.
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    /// Number of calls to `operation`.
    pub fn count(&self, operation: Operation) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| call.operation == operation)
            .count()
    }

    /// Remaining pending invitations.
    pub fn invitations(&self) -> Vec<OrganizationInvitation> {
        self.lock().invitations.clone()
    }

    /// All organizations (for test verification).
    pub fn organizations(&self) -> Vec<Organization> {
        self.lock().organizations.clone()
    }

    /// All projects (for test verification).
    pub fn projects(&self) -> Vec<Project> {
        self.lock().projects.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockApiInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record the call, then honour cancellation and configured failures.
    fn begin(
        &self,
        ctx: &Context,
        operation: Operation,
        args: &[&str],
    ) -> Result<std::sync::MutexGuard<'_, MockApiInner>, ApiError> {
        let mut inner = self.lock();
        inner.calls.push(MockCall {
            operation,
            args: args.iter().map(|a| a.to_string()).collect(),
        });
        if let Some(err) = ctx.err() {
            return Err(ApiError::request(operation)(err.into()));
        }
        if let Some(err) = inner.fail_on.get(&operation) {
            return Err(ApiError::request(operation)(err.clone()));
        }
        Ok(inner)
    }
}

fn not_found(operation: Operation, what: &str) -> ApiError {
    ApiError::request(operation)(TransportError::Http {
        status: 404,
        message: format!("{} not found", what),
    })
}

fn slugify(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[async_trait]
impl ArgusApi for MockApi {
    async fn get_user(&self, ctx: &Context) -> Result<User, ApiError> {
        let inner = self.begin(ctx, Operation::GetUser, &[])?;
        inner.user.clone().ok_or_else(|| {
            ApiError::request(Operation::GetUser)(TransportError::Auth {
                status: 401,
                message: "401 Unauthorized".into(),
            })
        })
    }

    async fn list_organization_invitations(
        &self,
        ctx: &Context,
    ) -> Result<Vec<OrganizationInvitation>, ApiError> {
        let inner = self.begin(ctx, Operation::ListOrganizationInvitations, &[])?;
        Ok(inner.invitations.clone())
    }

    async fn accept_organization_invitation(
        &self,
        ctx: &Context,
        invitation_id: &str,
    ) -> Result<(), ApiError> {
        require(invitation_id, "invitation ID")?;
        let op = Operation::AcceptOrganizationInvitation;
        let mut inner = self.begin(ctx, op, &[invitation_id])?;
        let index = inner
            .invitations
            .iter()
            .position(|inv| inv.id == invitation_id)
            .ok_or_else(|| not_found(op, "invitation"))?;
        let invitation = inner.invitations.remove(index);
        if !inner
            .organizations
            .iter()
            .any(|org| org.id == invitation.organization_id)
        {
            inner.organizations.push(Organization {
                id: invitation.organization_id.clone(),
                slug: slugify(&invitation.organization_name),
                name: invitation.organization_name,
            });
        }
        Ok(())
    }

    async fn list_organizations(&self, ctx: &Context) -> Result<Vec<Organization>, ApiError> {
        let inner = self.begin(ctx, Operation::ListOrganizations, &[])?;
        Ok(inner.organizations.clone())
    }

    async fn get_organization(
        &self,
        ctx: &Context,
        organization_id: &str,
    ) -> Result<Organization, ApiError> {
        require(organization_id, "organization ID")?;
        let op = Operation::GetOrganization;
        let inner = self.begin(ctx, op, &[organization_id])?;
        inner
            .organizations
            .iter()
            .find(|org| org.id == organization_id)
            .cloned()
            .ok_or_else(|| not_found(op, "organization"))
    }

    async fn create_organization(
        &self,
        ctx: &Context,
        request: &CreateOrganizationRequest,
    ) -> Result<Organization, ApiError> {
        require(&request.name, "organization name")?;
        let mut inner = self.begin(ctx, Operation::CreateOrganization, &[&request.name])?;
        inner.next_id += 1;
        let organization = Organization {
            id: format!("org_mock_{}", inner.next_id),
            name: request.name.clone(),
            slug: slugify(&request.name),
        };
        inner.organizations.push(organization.clone());
        Ok(organization)
    }

    async fn list_projects(
        &self,
        ctx: &Context,
        organization_id: &str,
    ) -> Result<Vec<Project>, ApiError> {
        require(organization_id, "organization ID")?;
        let inner = self.begin(ctx, Operation::ListProjects, &[organization_id])?;
        Ok(inner
            .projects
            .iter()
            .filter(|p| p.org_id == organization_id)
            .cloned()
            .collect())
    }

    async fn get_project(
        &self,
        ctx: &Context,
        organization_id: &str,
        project_id: &str,
    ) -> Result<Project, ApiError> {
        require(organization_id, "organization ID")?;
        require(project_id, "project ID")?;
        let op = Operation::GetProject;
        let inner = self.begin(ctx, op, &[organization_id, project_id])?;
        inner
            .projects
            .iter()
            .find(|p| p.id == project_id && p.org_id == organization_id)
            .cloned()
            .ok_or_else(|| not_found(op, "project"))
    }

    async fn create_project(
        &self,
        ctx: &Context,
        organization_id: &str,
        request: &CreateProjectRequest,
    ) -> Result<Project, ApiError> {
        require(organization_id, "organization ID")?;
        require(&request.name, "project name")?;
        let mut inner = self.begin(
            ctx,
            Operation::CreateProject,
            &[organization_id, &request.name],
        )?;
        inner.next_id += 1;
        let project = Project {
            id: format!("prj_mock_{}", inner.next_id),
            name: request.name.clone(),
            slug: slugify(&request.name),
            org_id: organization_id.to_string(),
        };
        inner.projects.push(project.clone());
        if !request.repo_url.is_empty() {
            inner.repo_links.insert(
                (request.repo_url.clone(), request.repo_path.clone()),
                project.id.clone(),
            );
        }
        Ok(project)
    }

    async fn find_project_by_repo(
        &self,
        ctx: &Context,
        repo_url: &str,
        repo_path: &str,
    ) -> Result<Option<Project>, ApiError> {
        require(repo_url, "repository URL")?;
        let inner = self.begin(ctx, Operation::FindProjectByRepo, &[repo_url, repo_path])?;
        let key = (repo_url.to_string(), repo_path.to_string());
        Ok(inner
            .repo_links
            .get(&key)
            .and_then(|id| inner.projects.iter().find(|p| &p.id == id))
            .cloned())
    }
}

//! api::client
//!
//! HTTP implementation of [`ArgusApi`] on top of [`Transport`].

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::envelope::parse_response;
use super::traits::{
    require, ApiError, ArgusApi, CreateOrganizationRequest, CreateProjectRequest, Operation,
    Organization, OrganizationInvitation, Project, User,
};
use super::transport::Transport;
use crate::core::context::Context;

/// Argus API client.
#[derive(Debug, Clone)]
pub struct HttpApi {
    transport: Transport,
}

impl HttpApi {
    /// Wrap a configured transport.
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        operation: Operation,
        path: &str,
    ) -> Result<T, ApiError> {
        let body = self
            .transport
            .get(ctx, path)
            .await
            .map_err(ApiError::request(operation))?;
        parse_response(&body).map_err(ApiError::request(operation))
    }

    async fn submit<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        ctx: &Context,
        operation: Operation,
        path: &str,
        request: &B,
    ) -> Result<T, ApiError> {
        let body = self
            .transport
            .post(ctx, path, request)
            .await
            .map_err(ApiError::request(operation))?;
        parse_response(&body).map_err(ApiError::request(operation))
    }
}

/// Percent-encode one path segment.
fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[async_trait]
impl ArgusApi for HttpApi {
    async fn get_user(&self, ctx: &Context) -> Result<User, ApiError> {
        self.fetch(ctx, Operation::GetUser, "/user").await
    }

    async fn list_organization_invitations(
        &self,
        ctx: &Context,
    ) -> Result<Vec<OrganizationInvitation>, ApiError> {
        self.fetch(ctx, Operation::ListOrganizationInvitations, "/user/invitations")
            .await
    }

    async fn accept_organization_invitation(
        &self,
        ctx: &Context,
        invitation_id: &str,
    ) -> Result<(), ApiError> {
        require(invitation_id, "invitation ID")?;
        let path = format!("/invitations/{}/accept", segment(invitation_id));
        // The acknowledgement body carries nothing we need
        self.transport
            .send::<()>(ctx, Method::POST, &path, None)
            .await
            .map_err(ApiError::request(Operation::AcceptOrganizationInvitation))?;
        Ok(())
    }

    async fn list_organizations(&self, ctx: &Context) -> Result<Vec<Organization>, ApiError> {
        self.fetch(ctx, Operation::ListOrganizations, "/organizations")
            .await
    }

    async fn get_organization(
        &self,
        ctx: &Context,
        organization_id: &str,
    ) -> Result<Organization, ApiError> {
        require(organization_id, "organization ID")?;
        let path = format!("/organizations/{}", segment(organization_id));
        self.fetch(ctx, Operation::GetOrganization, &path).await
    }

    async fn create_organization(
        &self,
        ctx: &Context,
        request: &CreateOrganizationRequest,
    ) -> Result<Organization, ApiError> {
        require(&request.name, "organization name")?;
        self.submit(ctx, Operation::CreateOrganization, "/organizations", request)
            .await
    }

    async fn list_projects(
        &self,
        ctx: &Context,
        organization_id: &str,
    ) -> Result<Vec<Project>, ApiError> {
        require(organization_id, "organization ID")?;
        let path = format!("/organizations/{}/projects", segment(organization_id));
        self.fetch(ctx, Operation::ListProjects, &path).await
    }

    async fn get_project(
        &self,
        ctx: &Context,
        organization_id: &str,
        project_id: &str,
    ) -> Result<Project, ApiError> {
        require(organization_id, "organization ID")?;
        require(project_id, "project ID")?;
        let path = format!(
            "/organizations/{}/projects/{}",
            segment(organization_id),
            segment(project_id)
        );
        self.fetch(ctx, Operation::GetProject, &path).await
    }

    async fn create_project(
        &self,
        ctx: &Context,
        organization_id: &str,
        request: &CreateProjectRequest,
    ) -> Result<Project, ApiError> {
        require(organization_id, "organization ID")?;
        require(&request.name, "project name")?;
        let path = format!("/organizations/{}/projects", segment(organization_id));
        self.submit(ctx, Operation::CreateProject, &path, request)
            .await
    }

    async fn find_project_by_repo(
        &self,
        ctx: &Context,
        repo_url: &str,
        repo_path: &str,
    ) -> Result<Option<Project>, ApiError> {
        require(repo_url, "repository URL")?;
        let path = format!(
            "/projects/lookup?repoURL={}&repoPath={}",
            segment(repo_url),
            segment(repo_path)
        );
        match self.fetch(ctx, Operation::FindProjectByRepo, &path).await {
            Ok(project) => Ok(Some(project)),
            Err(err) if err.is_missing_data() => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> HttpApi {
        // Port 9 (discard) is never contacted: validation fails first
        HttpApi::new(Transport::new("http://127.0.0.1:9"))
    }

    #[test]
    fn segment_encodes_reserved_characters() {
        assert_eq!(segment("a/b c"), "a%2Fb%20c");
        assert_eq!(
            segment("git@github.com:acme/api.git"),
            "git%40github.com%3Aacme%2Fapi.git"
        );
    }

    #[tokio::test]
    async fn empty_ids_fail_before_network() {
        let ctx = Context::background();
        let api = api();

        assert!(matches!(
            api.get_organization(&ctx, "").await,
            Err(ApiError::MissingField("organization ID"))
        ));
        assert!(matches!(
            api.get_project(&ctx, "org_1", "").await,
            Err(ApiError::MissingField("project ID"))
        ));
        assert!(matches!(
            api.list_projects(&ctx, " ").await,
            Err(ApiError::MissingField("organization ID"))
        ));
        assert!(matches!(
            api.accept_organization_invitation(&ctx, "").await,
            Err(ApiError::MissingField("invitation ID"))
        ));
        assert!(matches!(
            api.find_project_by_repo(&ctx, "", "sub").await,
            Err(ApiError::MissingField("repository URL"))
        ));
        assert!(matches!(
            api.create_organization(
                &ctx,
                &CreateOrganizationRequest {
                    name: String::new()
                }
            )
            .await,
            Err(ApiError::MissingField("organization name"))
        ));
    }
}

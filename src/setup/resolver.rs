//! setup::resolver
//!
//! Derives the [`CommandState`] for a [`SetupRequest`].
//!
//! # Procedure
//!
//! 1. Snapshot: locate the git repo and match it against known projects.
//! 2. Login check.
//! 3. Pending organization invitations.
//! 4. Repo-based project lookup.
//! 5. Organization and project resolution, cheapest path first.
//! 6. Fetch-or-create / select flows when the user must choose.
//! 7. Save the config once.
//!
//! Every step runs against the caller's [`Context`]; cancellation aborts
//! resolution without saving.

use std::sync::Arc;

use tracing::{debug, warn};

use super::errors::SetupError;
use super::handlers::{CreateFlags, EntityHandler, Handlers};
use super::requirements::{EntityKind, LoginRequirement, Requirement, SetupRequest};
use super::state::{organization_stub, project_stub, CommandState};
use crate::api::{ArgusApi, Organization, Project};
use crate::core::config::{Config, ConfigStore, RepoSnapshot};
use crate::core::context::Context;
use crate::git::RepoLocator;
use crate::ui::prompts::Prompter;

/// Resolver output: the state plus the updated config.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub state: CommandState,
    pub config: Config,
}

/// Command-state resolver.
#[derive(Clone)]
pub struct Resolver {
    api: Arc<dyn ArgusApi>,
    prompter: Arc<dyn Prompter>,
    repo: Arc<dyn RepoLocator>,
    store: Arc<dyn ConfigStore>,
    handlers: Handlers,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver").finish_non_exhaustive()
    }
}

/// Answer to the single-candidate question.
enum SingleAnswer {
    Use,
    Cancel,
    Create,
}

impl Resolver {
    pub fn new(
        api: Arc<dyn ArgusApi>,
        prompter: Arc<dyn Prompter>,
        repo: Arc<dyn RepoLocator>,
        store: Arc<dyn ConfigStore>,
        handlers: Handlers,
    ) -> Self {
        Self {
            api,
            prompter,
            repo,
            store,
            handlers,
        }
    }

    /// Resolve `request` against `config`.
    ///
    /// On success the config has been saved and is returned with the state.
    ///
    /// # Errors
    ///
    /// - [`SetupError::NotLoggedIn`] if login is required and missing
    /// - [`SetupError::CreationCanceled`] / [`SetupError::SelectionCanceled`]
    ///   if the user backs out of a prompt
    /// - [`SetupError::SaveConfig`] if the final save fails
    /// - any API, prompt, or context error, unchanged
    pub async fn resolve(
        &self,
        ctx: &Context,
        request: SetupRequest,
        mut config: Config,
    ) -> Result<Resolved, SetupError> {
        if let Some(err) = ctx.err() {
            return Err(err.into());
        }
        debug!(?request, "resolving command state");

        self.snapshot(&mut config);

        let mut state = CommandState {
            logged_in: config.credential.is_valid(),
            ..Default::default()
        };
        if request.login == LoginRequirement::NeedLogin {
            if !state.logged_in {
                return Err(SetupError::NotLoggedIn);
            }
            state.user = Some(self.api.get_user(ctx).await?);
        }

        if state.logged_in && request.login != LoginRequirement::Ignore {
            self.handle_invitations(ctx).await?;
        }

        if !config.repo.known && request.wants_repo_lookup() {
            self.lookup_repo(ctx, state.logged_in, &mut config).await?;
        }

        self.resolve_entities(ctx, request, &mut config, &mut state)
            .await?;

        self.store.save(&config).map_err(SetupError::SaveConfig)?;
        debug!(
            organization = ?state.organization_id(),
            project = ?state.project_id(),
            "command state resolved"
        );
        Ok(Resolved { state, config })
    }

    /// Step 1: recompute the transient repo fields.
    fn snapshot(&self, config: &mut Config) {
        config.repo = RepoSnapshot::default();

        let location = match self.repo.find_git_path_and_url() {
            Ok(location) => location,
            Err(err) => {
                debug!(error = %err, "no git repository");
                return;
            }
        };
        config.repo.url = location.url;
        config.repo.path = location.path;
        if !config.repo.in_repo() {
            return;
        }

        if let Some(known) = config
            .find_known_project(&config.repo.url, &config.repo.path)
            .cloned()
        {
            debug!(project = %known.project_id, "repo is a known project");
            config.organization_id = known.organization_id;
            config.project_id = known.project_id;
            config.repo.project_name = known.project_name;
            config.repo.known = true;
        }
    }

    /// Step 3: offer each pending invitation.
    async fn handle_invitations(&self, ctx: &Context) -> Result<(), SetupError> {
        let invitations = self.api.list_organization_invitations(ctx).await?;
        for invitation in invitations {
            let question = if invitation.invited_by.is_empty() {
                format!(
                    "You have been invited to join {}. Accept?",
                    invitation.organization_name
                )
            } else {
                format!(
                    "{} invited you to join {}. Accept?",
                    invitation.invited_by, invitation.organization_name
                )
            };
            if self.prompter.confirm(ctx, &question, true).await? {
                self.api
                    .accept_organization_invitation(ctx, &invitation.id)
                    .await?;
                self.prompter
                    .say(&format!("Joined {}.", invitation.organization_name));
            } else {
                debug!(invitation = %invitation.id, "invitation declined");
            }
        }
        Ok(())
    }

    /// Step 4: ask the server which project this repo belongs to.
    async fn lookup_repo(
        &self,
        ctx: &Context,
        logged_in: bool,
        config: &mut Config,
    ) -> Result<(), SetupError> {
        if !logged_in {
            return Err(SetupError::NotLoggedInForRepoLookup);
        }
        if !config.repo.in_repo() {
            debug!("not in a git repository, skipping repo lookup");
            return Ok(());
        }

        let found = self
            .api
            .find_project_by_repo(ctx, &config.repo.url, &config.repo.path)
            .await?;
        let Some(project) = found else {
            debug!(url = %config.repo.url, path = %config.repo.path, "no project linked to repo");
            return Ok(());
        };

        if project.org_id.is_empty() {
            return Err(SetupError::LookupWithoutOrganization {
                project: project.id,
            });
        }
        config.organization_id = project.org_id.clone();
        config.project_id = project.id.clone();
        config.repo.project_name = project.name.clone();
        config.repo.known = true;

        let (url, path) = (config.repo.url.clone(), config.repo.path.clone());
        config.add_known_project(&project.id, &project.name, &project.org_id, &url, &path);
        if let Err(err) = self.store.save(config) {
            warn!(error = %err, "failed to remember project for this repo");
        }
        Ok(())
    }

    /// Step 5.
    async fn resolve_entities(
        &self,
        ctx: &Context,
        request: SetupRequest,
        config: &mut Config,
        state: &mut CommandState,
    ) -> Result<(), SetupError> {
        if request.organization == Requirement::MustNotExist && !config.organization_id.is_empty()
        {
            return Err(SetupError::OrganizationExists {
                id: config.organization_id.clone(),
            });
        }
        if request.project == Requirement::MustNotExist && !config.project_id.is_empty() {
            return Err(SetupError::ProjectExists {
                id: config.project_id.clone(),
            });
        }
        if request.organization == Requirement::MustNotExist
            && request.project == Requirement::MustNotExist
        {
            return Ok(());
        }

        if request
            .organization
            .satisfied_by_id(!config.organization_id.is_empty())
            && request
                .project
                .satisfied_by_id(!config.project_id.is_empty())
        {
            if request.organization.is_id_only() {
                state.organization = Some(organization_stub(&config.organization_id));
            }
            if request.project.is_id_only() {
                state.project = Some(project_stub(
                    &config.project_id,
                    &config.repo.project_name,
                    &config.organization_id,
                ));
            }
            return Ok(());
        }

        if config.repo.known && self.fetch_known(ctx, request, config, state).await? {
            return Ok(());
        }

        // A known organization that was just fetched is not fetched again
        if state.organization.is_none() {
            state.organization = self
                .resolve_organization(ctx, request.organization, config)
                .await?;
        }
        state.project = self.resolve_project(ctx, request.project, config).await?;
        Ok(())
    }

    /// Fast path for a known repo: fetch both records by ID.
    ///
    /// Returns `Ok(false)` when a record is gone. The stale link is dropped
    /// and the failed IDs cleared, so the regular flow lists and prompts
    /// instead of fetching the same IDs again.
    async fn fetch_known(
        &self,
        ctx: &Context,
        request: SetupRequest,
        config: &mut Config,
        state: &mut CommandState,
    ) -> Result<bool, SetupError> {
        if request.organization != Requirement::Ignore {
            match self.api.get_organization(ctx, &config.organization_id).await {
                Ok(org) => state.organization = Some(org),
                Err(err) if err.is_auth() || err.is_canceled() => return Err(err.into()),
                Err(err) => {
                    warn!(error = %err, "known organization could not be fetched");
                    forget_known(config);
                    config.organization_id.clear();
                    return Ok(false);
                }
            }
        }
        if request.project != Requirement::Ignore {
            match self
                .api
                .get_project(ctx, &config.organization_id, &config.project_id)
                .await
            {
                Ok(project) => state.project = Some(project),
                Err(err) if err.is_auth() || err.is_canceled() => return Err(err.into()),
                Err(err) => {
                    warn!(error = %err, "known project could not be fetched");
                    forget_known(config);
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    async fn resolve_organization(
        &self,
        ctx: &Context,
        level: Requirement,
        config: &mut Config,
    ) -> Result<Option<Organization>, SetupError> {
        let known = !config.organization_id.is_empty();
        let organization = match level {
            Requirement::Ignore | Requirement::MustNotExist | Requirement::NeedRepoLookup => {
                return Ok(None)
            }
            Requirement::NeedIdOnly | Requirement::NeedExistingIdOnly if known => {
                return Ok(Some(organization_stub(&config.organization_id)))
            }
            Requirement::NeedData | Requirement::NeedExistingData if known => {
                return Ok(Some(
                    self.api
                        .get_organization(ctx, &config.organization_id)
                        .await?,
                ))
            }
            Requirement::NeedData
            | Requirement::NeedIdOnly
            | Requirement::NeedExistingData
            | Requirement::NeedExistingIdOnly => {
                let candidates = self.api.list_organizations(ctx).await?;
                let flags = self.create_flags(config);
                self.choose(
                    ctx,
                    EntityKind::Organization,
                    candidates,
                    self.handlers.organization.as_ref(),
                    &flags,
                    level.is_existing_only(),
                    true,
                )
                .await?
            }
        };

        if config.organization_id != organization.id {
            config.project_id.clear();
            config.repo.project_name.clear();
        }
        config.organization_id = organization.id.clone();
        Ok(Some(organization))
    }

    async fn resolve_project(
        &self,
        ctx: &Context,
        level: Requirement,
        config: &mut Config,
    ) -> Result<Option<Project>, SetupError> {
        if matches!(
            level,
            Requirement::Ignore | Requirement::MustNotExist | Requirement::NeedRepoLookup
        ) {
            return Ok(None);
        }
        if config.organization_id.is_empty() {
            return Err(SetupError::NoOrganizationSelected);
        }

        let known = !config.project_id.is_empty();
        let project = match level {
            Requirement::Ignore | Requirement::MustNotExist | Requirement::NeedRepoLookup => {
                return Ok(None)
            }
            Requirement::NeedIdOnly | Requirement::NeedExistingIdOnly if known => {
                return Ok(Some(project_stub(
                    &config.project_id,
                    &config.repo.project_name,
                    &config.organization_id,
                )))
            }
            Requirement::NeedData | Requirement::NeedExistingData if known => {
                return Ok(Some(
                    self.api
                        .get_project(ctx, &config.organization_id, &config.project_id)
                        .await?,
                ))
            }
            Requirement::NeedData
            | Requirement::NeedIdOnly
            | Requirement::NeedExistingData
            | Requirement::NeedExistingIdOnly => {
                let candidates = self.api.list_projects(ctx, &config.organization_id).await?;
                let flags = self.create_flags(config);
                self.choose(
                    ctx,
                    EntityKind::Project,
                    candidates,
                    self.handlers.project.as_ref(),
                    &flags,
                    level.is_existing_only(),
                    config.repo.in_repo(),
                )
                .await?
            }
        };

        config.project_id = project.id.clone();
        config.repo.project_name = project.name.clone();
        Ok(Some(project))
    }

    fn create_flags(&self, config: &Config) -> CreateFlags {
        CreateFlags {
            organization_id: config.organization_id.clone(),
            repo_url: config.repo.url.clone(),
            repo_path: config.repo.path.clone(),
            name: None,
        }
    }

    /// Step 6: pick one of `candidates`, or create a new entity.
    #[allow(clippy::too_many_arguments)]
    async fn choose<T>(
        &self,
        ctx: &Context,
        kind: EntityKind,
        mut candidates: Vec<T>,
        handler: &dyn EntityHandler<T>,
        flags: &CreateFlags,
        existing_only: bool,
        can_create: bool,
    ) -> Result<T, SetupError>
    where
        T: std::fmt::Display + Clone + Send + Sync,
    {
        let allow_create = can_create && !existing_only;

        match candidates.len() {
            0 if existing_only => Err(SetupError::NoneAvailable { kind }),
            0 if !can_create => Err(SetupError::CreationCanceled { kind }),
            0 => {
                let question = format!("No {}s found. Create one?", kind);
                if self.prompter.confirm(ctx, &question, true).await? {
                    Ok(handler.create(ctx, flags).await?)
                } else {
                    Err(SetupError::CreationCanceled { kind })
                }
            }
            1 => {
                let candidate = candidates.remove(0);
                match self.ask_single(ctx, kind, &candidate, allow_create).await? {
                    SingleAnswer::Use => Ok(candidate),
                    SingleAnswer::Cancel => Err(SetupError::SelectionCanceled { kind }),
                    SingleAnswer::Create => Ok(handler.create(ctx, flags).await?),
                }
            }
            _ => Ok(handler
                .switch(ctx, &candidates, flags, allow_create)
                .await?),
        }
    }

    /// "Use this one?" with an optional create choice; re-asks on bad input.
    async fn ask_single<T: std::fmt::Display + Sync>(
        &self,
        ctx: &Context,
        kind: EntityKind,
        candidate: &T,
        allow_create: bool,
    ) -> Result<SingleAnswer, SetupError> {
        let (question, hint) = if allow_create {
            (
                format!("Use {} {}? (Y/n/c to create new)", kind, candidate),
                "Please answer y, n or c.",
            )
        } else {
            (
                format!("Use {} {}? (Y/n)", kind, candidate),
                "Please answer y or n.",
            )
        };

        loop {
            let answer = self.prompter.prompt(ctx, &question, "y").await?;
            match answer.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(SingleAnswer::Use),
                "n" | "no" => return Ok(SingleAnswer::Cancel),
                "c" | "create" if allow_create => return Ok(SingleAnswer::Create),
                _ => self.prompter.say(hint),
            }
        }
    }
}

/// Drop the link for the current repo location and the project it named.
fn forget_known(config: &mut Config) {
    let (url, path) = (config.repo.url.clone(), config.repo.path.clone());
    config.remove_known_project(&url, &path);
    config.project_id.clear();
    config.repo.project_name.clear();
    config.repo.known = false;
}

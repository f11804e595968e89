//! setup::handlers
//!
//! Interactive creation and selection of organizations and projects.
//!
//! The resolver delegates to an [`EntityHandler`] whenever the user has to
//! name a new entity or pick one out of several. The `org`/`project`
//! commands reuse the same handlers for `create` and `switch`.

use std::fmt::Display;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use super::requirements::EntityKind;
use crate::api::{
    ApiError, ArgusApi, CreateOrganizationRequest, CreateProjectRequest, Organization, Project,
};
use crate::core::context::Context;
use crate::ui::prompts::{PromptError, Prompter};

/// Errors from handlers.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{0} name cannot be empty")]
    EmptyName(EntityKind),

    #[error("no {0}s to choose from")]
    NoCandidates(EntityKind),

    #[error("projects can only be created inside a git repository")]
    NotInRepo,

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl HandlerError {
    pub fn is_canceled(&self) -> bool {
        match self {
            HandlerError::Prompt(err) => matches!(err, PromptError::Context(_)),
            HandlerError::Api(err) => err.is_canceled(),
            _ => false,
        }
    }
}

/// Inputs for creating an entity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateFlags {
    /// Organization a new project goes into.
    pub organization_id: String,
    /// Repo a new project is linked to.
    pub repo_url: String,
    pub repo_path: String,
    /// Name given up front; prompted for when `None`.
    pub name: Option<String>,
}

/// Creates and selects entities of type `T`.
#[async_trait]
pub trait EntityHandler<T: Send + Sync>: Send + Sync {
    /// Create a new entity.
    async fn create(&self, ctx: &Context, flags: &CreateFlags) -> Result<T, HandlerError>;

    /// Let the user pick one of `candidates`, or create a new one when
    /// `allow_create` is set.
    async fn switch(
        &self,
        ctx: &Context,
        candidates: &[T],
        flags: &CreateFlags,
        allow_create: bool,
    ) -> Result<T, HandlerError>;
}

/// Both handlers the resolver needs.
#[derive(Clone)]
pub struct Handlers {
    pub organization: Arc<dyn EntityHandler<Organization>>,
    pub project: Arc<dyn EntityHandler<Project>>,
}

impl Handlers {
    /// Prompt-driven handlers backed by `api`.
    pub fn interactive(api: Arc<dyn ArgusApi>, prompter: Arc<dyn Prompter>) -> Self {
        Self {
            organization: Arc::new(OrganizationHandler::new(api.clone(), prompter.clone())),
            project: Arc::new(ProjectHandler::new(api, prompter)),
        }
    }
}

impl std::fmt::Debug for Handlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Handlers").finish_non_exhaustive()
    }
}

/// A menu answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Existing(usize),
    Create,
}

/// Show a numbered menu and read a choice, re-asking on invalid input.
pub async fn choose_from_menu<T: Display + Sync>(
    ctx: &Context,
    prompter: &dyn Prompter,
    kind: EntityKind,
    items: &[T],
    allow_create: bool,
) -> Result<Choice, PromptError> {
    let max = if allow_create {
        items.len() + 1
    } else {
        items.len()
    };

    prompter.say(&format!("Select {}:", kind.with_article()));
    for (i, item) in items.iter().enumerate() {
        prompter.say(&format!("  {}) {}", i + 1, item));
    }
    if allow_create {
        prompter.say(&format!("  {}) Create a new {}", max, kind));
    }

    loop {
        let answer = prompter.prompt(ctx, "Enter a number", "").await?;
        match answer.trim().parse::<usize>() {
            Ok(n) if (1..=items.len()).contains(&n) => return Ok(Choice::Existing(n - 1)),
            Ok(n) if allow_create && n == max => return Ok(Choice::Create),
            _ => prompter.say(&format!("Please enter a number between 1 and {}.", max)),
        }
    }
}

/// Use `given` if set, otherwise prompt until a non-empty name is entered.
async fn read_name(
    ctx: &Context,
    prompter: &dyn Prompter,
    kind: EntityKind,
    given: Option<&str>,
    default: &str,
) -> Result<String, HandlerError> {
    if let Some(name) = given {
        let name = name.trim();
        if name.is_empty() {
            return Err(HandlerError::EmptyName(kind));
        }
        return Ok(name.to_string());
    }

    let question = format!("{} name", capitalize(&kind.to_string()));
    loop {
        let name = prompter.prompt(ctx, &question, default).await?;
        let name = name.trim();
        if !name.is_empty() {
            return Ok(name.to_string());
        }
        prompter.say("Name cannot be empty.");
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Suggested project name: the last path segment, else the repo name.
pub fn default_project_name(repo_url: &str, repo_path: &str) -> String {
    if let Some(last) = repo_path.rsplit('/').find(|s| !s.is_empty()) {
        return last.to_string();
    }
    let trimmed = repo_url.trim_end_matches('/');
    let name = trimmed
        .rsplit(['/', ':'])
        .next()
        .unwrap_or(trimmed);
    name.strip_suffix(".git").unwrap_or(name).to_string()
}

/// Prompt-driven organization handler.
pub struct OrganizationHandler {
    api: Arc<dyn ArgusApi>,
    prompter: Arc<dyn Prompter>,
}

impl OrganizationHandler {
    pub fn new(api: Arc<dyn ArgusApi>, prompter: Arc<dyn Prompter>) -> Self {
        Self { api, prompter }
    }
}

#[async_trait]
impl EntityHandler<Organization> for OrganizationHandler {
    async fn create(&self, ctx: &Context, flags: &CreateFlags) -> Result<Organization, HandlerError> {
        let kind = EntityKind::Organization;
        let name = read_name(ctx, self.prompter.as_ref(), kind, flags.name.as_deref(), "").await?;
        tracing::debug!(%name, "creating organization");

        let organization = self
            .api
            .create_organization(ctx, &CreateOrganizationRequest { name })
            .await?;
        self.prompter
            .say(&format!("Created organization {}.", organization));
        Ok(organization)
    }

    async fn switch(
        &self,
        ctx: &Context,
        candidates: &[Organization],
        flags: &CreateFlags,
        allow_create: bool,
    ) -> Result<Organization, HandlerError> {
        let kind = EntityKind::Organization;
        if candidates.is_empty() && !allow_create {
            return Err(HandlerError::NoCandidates(kind));
        }
        match choose_from_menu(ctx, self.prompter.as_ref(), kind, candidates, allow_create).await? {
            Choice::Existing(index) => Ok(candidates[index].clone()),
            Choice::Create => self.create(ctx, flags).await,
        }
    }
}

/// Prompt-driven project handler.
pub struct ProjectHandler {
    api: Arc<dyn ArgusApi>,
    prompter: Arc<dyn Prompter>,
}

impl ProjectHandler {
    pub fn new(api: Arc<dyn ArgusApi>, prompter: Arc<dyn Prompter>) -> Self {
        Self { api, prompter }
    }
}

#[async_trait]
impl EntityHandler<Project> for ProjectHandler {
    async fn create(&self, ctx: &Context, flags: &CreateFlags) -> Result<Project, HandlerError> {
        let kind = EntityKind::Project;
        if flags.repo_url.is_empty() {
            return Err(HandlerError::NotInRepo);
        }
        let default = default_project_name(&flags.repo_url, &flags.repo_path);
        let name = read_name(
            ctx,
            self.prompter.as_ref(),
            kind,
            flags.name.as_deref(),
            &default,
        )
        .await?;
        tracing::debug!(%name, organization = %flags.organization_id, "creating project");

        let request = CreateProjectRequest {
            name,
            repo_url: flags.repo_url.clone(),
            repo_path: flags.repo_path.clone(),
        };
        let mut project = self
            .api
            .create_project(ctx, &flags.organization_id, &request)
            .await?;
        if project.org_id.is_empty() {
            project.org_id = flags.organization_id.clone();
        }
        self.prompter.say(&format!("Created project {}.", project));
        Ok(project)
    }

    async fn switch(
        &self,
        ctx: &Context,
        candidates: &[Project],
        flags: &CreateFlags,
        allow_create: bool,
    ) -> Result<Project, HandlerError> {
        let kind = EntityKind::Project;
        if candidates.is_empty() && !allow_create {
            return Err(HandlerError::NoCandidates(kind));
        }
        match choose_from_menu(ctx, self.prompter.as_ref(), kind, candidates, allow_create).await? {
            Choice::Existing(index) => Ok(candidates[index].clone()),
            Choice::Create => self.create(ctx, flags).await,
        }
    }
}

//! cli::commands::project
//!
//! `project list | switch | create`.
//!
//! Projects live inside the current organization. `create` links the new
//! project to the git repository (and subdirectory) it is run from, so later
//! commands in that directory resolve it without prompting.

use anyhow::{bail, Context as _, Result};

use super::org::listing_line;
use crate::api::Project;
use crate::cli::session::Session;
use crate::cli::args::ProjectAction;
use crate::core::config::Config;
use crate::core::context::Context;
use crate::setup::{CreateFlags, LoginRequirement, Requirement, SetupRequest};
use crate::ui::output;

/// Needs an existing organization ID; the project is chosen by the command.
const IN_ORGANIZATION: SetupRequest = SetupRequest::new(
    LoginRequirement::NeedLogin,
    Requirement::NeedExistingIdOnly,
    Requirement::Ignore,
);

/// Needs an organization to create in, and whatever this repo maps to.
const FOR_CREATE: SetupRequest = SetupRequest::new(
    LoginRequirement::NeedLogin,
    Requirement::NeedData,
    Requirement::NeedRepoLookup,
);

pub async fn run(ctx: &Context, session: &Session, action: ProjectAction) -> Result<()> {
    match action {
        ProjectAction::List => list(ctx, session).await,
        ProjectAction::Switch => switch(ctx, session).await,
        ProjectAction::Create { name } => create(ctx, session, name).await,
    }
}

async fn list(ctx: &Context, session: &Session) -> Result<()> {
    let resolved = session.resolve(ctx, IN_ORGANIZATION).await?;
    let config = &resolved.config;
    let projects = session
        .api
        .list_projects(ctx, &config.organization_id)
        .await?;

    if projects.is_empty() {
        output::print(
            "No projects. Create one with `argus project create` inside a git repository.",
            session.verbosity,
        );
        return Ok(());
    }
    for project in &projects {
        println!(
            "{}",
            listing_line(&project.id, project, &config.project_id)
        );
    }
    Ok(())
}

async fn switch(ctx: &Context, session: &Session) -> Result<()> {
    let resolved = session.resolve(ctx, IN_ORGANIZATION).await?;
    let mut config = resolved.config;
    let projects = session
        .api
        .list_projects(ctx, &config.organization_id)
        .await?;

    let flags = create_flags(&config, None);
    let chosen = session
        .handlers
        .project
        .switch(ctx, &projects, &flags, config.repo.in_repo())
        .await
        .context("failed to switch project")?;

    if !projects.iter().any(|p| p.id == chosen.id) {
        link(&mut config, &chosen);
    }
    select(&mut config, &chosen);
    session.save_config(&config)?;
    output::print(format!("Now using project {}.", chosen), session.verbosity);
    Ok(())
}

async fn create(ctx: &Context, session: &Session, name: Option<String>) -> Result<()> {
    let resolved = session.resolve(ctx, FOR_CREATE).await?;
    if let Some(existing) = resolved.state.project {
        bail!(
            "this repository is already linked to project {}",
            existing
        );
    }
    let mut config = resolved.config;
    if !config.repo.in_repo() {
        bail!("projects can only be created inside a git repository");
    }

    let flags = create_flags(&config, name);
    let created = session
        .handlers
        .project
        .create(ctx, &flags)
        .await
        .context("failed to create project")?;

    link(&mut config, &created);
    select(&mut config, &created);
    session.save_config(&config)?;
    output::print(
        format!("Now using project {}.", created),
        session.verbosity,
    );
    Ok(())
}

fn create_flags(config: &Config, name: Option<String>) -> CreateFlags {
    CreateFlags {
        organization_id: config.organization_id.clone(),
        repo_url: config.repo.url.clone(),
        repo_path: config.repo.path.clone(),
        name,
    }
}

fn select(config: &mut Config, project: &Project) {
    config.project_id = project.id.clone();
    config.repo.project_name = project.name.clone();
}

/// Remember that the current repo location belongs to `project`.
fn link(config: &mut Config, project: &Project) {
    if !config.repo.in_repo() {
        return;
    }
    let organization_id = if project.org_id.is_empty() {
        config.organization_id.clone()
    } else {
        project.org_id.clone()
    };
    let (url, path) = (config.repo.url.clone(), config.repo.path.clone());
    config.add_known_project(&project.id, &project.name, organization_id, url, path);
    config.repo.known = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::RepoSnapshot;

    fn project() -> Project {
        Project {
            id: "p1".into(),
            name: "api".into(),
            slug: "api".into(),
            org_id: "o1".into(),
        }
    }

    #[test]
    fn link_records_known_project() {
        let mut config = Config {
            repo: RepoSnapshot {
                url: "url".into(),
                path: "svc".into(),
                ..Default::default()
            },
            ..Default::default()
        };

        link(&mut config, &project());
        select(&mut config, &project());

        let known = config.find_known_project("url", "svc").unwrap();
        assert_eq!(known.organization_id, "o1");
        assert_eq!(known.project_id, "p1");
        assert!(config.repo.known);
        assert_eq!(config.repo.project_name, "api");
    }

    #[test]
    fn link_outside_repo_is_noop() {
        let mut config = Config::default();
        link(&mut config, &project());
        assert!(config.known_projects.is_empty());
    }
}

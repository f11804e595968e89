//! cli::commands::org
//!
//! `org list | switch | create`.

use anyhow::{Context as _, Result};

use crate::api::Organization;
use crate::cli::args::OrgAction;
use crate::cli::session::Session;
use crate::core::config::Config;
use crate::core::context::Context;
use crate::setup::{CreateFlags, SetupRequest};
use crate::ui::output;

pub async fn run(ctx: &Context, session: &Session, action: OrgAction) -> Result<()> {
    match action {
        OrgAction::List => list(ctx, session).await,
        OrgAction::Switch => switch(ctx, session).await,
        OrgAction::Create { name } => create(ctx, session, name).await,
    }
}

async fn list(ctx: &Context, session: &Session) -> Result<()> {
    let resolved = session.resolve(ctx, SetupRequest::login()).await?;
    let organizations = session.api.list_organizations(ctx).await?;

    if organizations.is_empty() {
        output::print(
            "No organizations. Create one with `argus org create`.",
            session.verbosity,
        );
        return Ok(());
    }
    for org in &organizations {
        println!(
            "{}",
            listing_line(&org.id, org, &resolved.config.organization_id)
        );
    }
    Ok(())
}

async fn switch(ctx: &Context, session: &Session) -> Result<()> {
    let resolved = session.resolve(ctx, SetupRequest::login()).await?;
    let organizations = session.api.list_organizations(ctx).await?;

    let chosen = session
        .handlers
        .organization
        .switch(ctx, &organizations, &CreateFlags::default(), true)
        .await
        .context("failed to switch organization")?;

    let mut config = resolved.config;
    select(&mut config, &chosen);
    session.save_config(&config)?;
    output::print(
        format!("Now using organization {}.", chosen),
        session.verbosity,
    );
    Ok(())
}

async fn create(ctx: &Context, session: &Session, name: Option<String>) -> Result<()> {
    let resolved = session.resolve(ctx, SetupRequest::login()).await?;
    let flags = CreateFlags {
        name,
        ..Default::default()
    };

    let created = session
        .handlers
        .organization
        .create(ctx, &flags)
        .await
        .context("failed to create organization")?;

    let mut config = resolved.config;
    select(&mut config, &created);
    session.save_config(&config)?;
    output::print(
        format!("Now using organization {}.", created),
        session.verbosity,
    );
    Ok(())
}

/// Make `org` current; a different organization drops the project.
fn select(config: &mut Config, org: &Organization) {
    if config.organization_id != org.id {
        config.project_id.clear();
    }
    config.organization_id = org.id.clone();
}

/// `* name (slug)  id` with the marker on the current entry.
pub(crate) fn listing_line(id: &str, item: impl std::fmt::Display, current: &str) -> String {
    let marker = if id == current { '*' } else { ' ' };
    format!("{} {}  {}", marker, item, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switching_drops_project() {
        let mut config = Config {
            organization_id: "o1".into(),
            project_id: "p1".into(),
            ..Default::default()
        };
        let same = Organization {
            id: "o1".into(),
            ..Default::default()
        };
        select(&mut config, &same);
        assert_eq!(config.project_id, "p1");

        let other = Organization {
            id: "o2".into(),
            ..Default::default()
        };
        select(&mut config, &other);
        assert_eq!(config.organization_id, "o2");
        assert!(config.project_id.is_empty());
    }

    #[test]
    fn current_entry_is_marked() {
        assert_eq!(listing_line("o1", "Acme", "o1"), "* Acme  o1");
        assert_eq!(listing_line("o2", "Initech", "o1"), "  Initech  o2");
    }
}

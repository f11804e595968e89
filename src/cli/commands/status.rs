//! cli::commands::status
//!
//! Show the resolved context without requiring anything.

use anyhow::Result;

use super::auth::describe_user;
use crate::cli::session::Session;
use crate::core::config::Config;
use crate::core::context::Context;
use crate::setup::SetupRequest;
use crate::ui::output;

pub async fn status(ctx: &Context, session: &Session) -> Result<()> {
    let resolved = session.resolve(ctx, SetupRequest::NONE).await?;
    output::print(
        render(&resolved.config, resolved.state.logged_in),
        session.verbosity,
    );
    Ok(())
}

fn render(config: &Config, logged_in: bool) -> String {
    let mut lines = Vec::new();

    if logged_in {
        let credential = &config.credential;
        lines.push(format!(
            "Logged in as {}",
            describe_user(&credential.name, &credential.email)
        ));
    } else if !config.credential.token.is_empty() {
        lines.push("Login expired, run `argus login`".to_string());
    } else {
        lines.push("Not logged in".to_string());
    }

    lines.push(format!("Organization: {}", or_none(&config.organization_id)));
    let project = if config.repo.project_name.is_empty() {
        or_none(&config.project_id).to_string()
    } else {
        format!("{} ({})", config.repo.project_name, config.project_id)
    };
    lines.push(format!("Project: {}", project));

    if config.repo.in_repo() {
        let location = if config.repo.path.is_empty() {
            config.repo.url.clone()
        } else {
            format!("{} ({})", config.repo.url, config.repo.path)
        };
        let link = if config.repo.known {
            "linked"
        } else {
            "not linked"
        };
        lines.push(format!("Repository: {}, {}", location, link));
    }

    lines.join("\n")
}

fn or_none(value: &str) -> &str {
    if value.is_empty() {
        "(none)"
    } else {
        value
    }
}

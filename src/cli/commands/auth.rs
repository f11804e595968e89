//! cli::commands::auth
//!
//! `login`, `logout` and `whoami`.
//!
//! # Design
//!
//! - The token is verified with `GET /user` before it is stored
//! - Tokens are NEVER printed to stdout/stderr
//! - Without `--token`, the token is read without echo (interactive only)
//!
//! # Example
//!
//! ```bash
//! # Interactive (prompts for token)
//! argus login
//!
//! # Non-interactive
//! argus login --token argus_xxxx
//! ```

use anyhow::{bail, Context as _, Result};
use chrono::{Duration, Utc};

use crate::api::ArgusApi;
use crate::cli::session::Session;
use crate::core::config::Credential;
use crate::core::context::Context;
use crate::setup::SetupRequest;
use crate::ui::output;

/// Stored credentials expire after this many days.
const TOKEN_TTL_DAYS: i64 = 30;

/// Verify `token` (or a prompted one) and store it.
pub async fn login(ctx: &Context, session: &Session, token: Option<String>) -> Result<()> {
    let token = match token {
        Some(token) => token,
        None => read_token(ctx, session).await?,
    };
    let token = token.trim().to_string();
    if token.is_empty() {
        bail!("Token cannot be empty.");
    }

    let user = session
        .api_with_token(&token)
        .get_user(ctx)
        .await
        .context("failed to verify token")?;

    let mut config = session.load_config()?;
    config.credential = Credential {
        token,
        token_expires_at: Some(Utc::now() + Duration::days(TOKEN_TTL_DAYS)),
        user_id: user.id,
        name: user.name,
        email: user.email,
    };
    session
        .store
        .save(&config)
        .context("failed to store credential")?;

    output::print(
        format!(
            "Logged in as {}.",
            describe_user(&config.credential.name, &config.credential.email)
        ),
        session.verbosity,
    );
    Ok(())
}

/// Remove the stored credential.
pub fn logout(session: &Session) -> Result<()> {
    let mut config = session.load_config()?;
    if config.credential.token.is_empty() {
        output::print("Not logged in.", session.verbosity);
        return Ok(());
    }
    config.clear_credential();
    session.save_config(&config)?;
    output::print("Logged out.", session.verbosity);
    Ok(())
}

/// Show the user the stored token belongs to.
pub async fn whoami(ctx: &Context, session: &Session) -> Result<()> {
    let resolved = session.resolve(ctx, SetupRequest::login()).await?;
    let Some(user) = resolved.state.user else {
        bail!("no user returned for the current token");
    };
    // Quiet mode still prints: this is the command's output
    println!("{}", describe_user(&user.name, &user.email));
    Ok(())
}

async fn read_token(ctx: &Context, session: &Session) -> Result<String> {
    if !session.interactive {
        bail!("Token required. Use --token <TOKEN> or run interactively.");
    }
    let read = tokio::task::spawn_blocking(|| rpassword::prompt_password("Argus API token: "));
    let token = ctx
        .run(read)
        .await?
        .context("token prompt failed")?
        .context("failed to read token")?;
    Ok(token)
}

pub(crate) fn describe_user(name: &str, email: &str) -> String {
    match (name.is_empty(), email.is_empty()) {
        (false, false) => format!("{} <{}>", name, email),
        (false, true) => name.to_string(),
        (true, false) => email.to_string(),
        (true, true) => "(unknown user)".to_string(),
    }
}

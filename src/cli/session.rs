//! cli::session
//!
//! Everything a command needs, wired up once per invocation.

use std::sync::Arc;

use anyhow::{Context as _, Result};

use super::args::Cli;
use crate::api::{ArgusApi, HttpApi, Transport};
use crate::core::config::{Config, ConfigStore, FileConfigStore, Settings};
use crate::core::context::Context;
use crate::git::{Git2Locator, RepoLocator};
use crate::setup::{Handlers, Resolved, Resolver, SetupRequest};
use crate::ui::output::{StatusLine, Verbosity};
use crate::ui::prompts::{Prompter, TerminalPrompter};

/// Collaborators shared by all commands.
pub struct Session {
    pub verbosity: Verbosity,
    pub interactive: bool,
    pub api: Arc<dyn ArgusApi>,
    pub prompter: Arc<dyn Prompter>,
    pub store: Arc<dyn ConfigStore>,
    pub repo: Arc<dyn RepoLocator>,
    pub handlers: Handlers,
    /// Unauthenticated transport, for verifying a new token.
    transport: Transport,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("verbosity", &self.verbosity)
            .field("interactive", &self.interactive)
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Build the production session from parsed flags, settings, and the
    /// stored credential.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let settings = Settings::load().context("failed to load settings")?;
        let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);
        let interactive = cli.interactive(settings.interactive());

        let store = FileConfigStore::new().context("failed to locate config file")?;
        let config = store.load().context("failed to load config")?;

        let transport =
            Transport::new(settings.api_url()).with_status_line(StatusLine::stderr(verbosity));
        let api: Arc<dyn ArgusApi> = Arc::new(HttpApi::new(
            transport.clone().with_token(config.credential.token.as_str()),
        ));
        let prompter: Arc<dyn Prompter> = Arc::new(TerminalPrompter::new(interactive));
        let repo = match &cli.cwd {
            Some(dir) => Git2Locator::at(dir),
            None => Git2Locator::current_dir(),
        };

        tracing::debug!(api_url = settings.api_url(), interactive, "session ready");
        Ok(Self::with_parts(
            verbosity,
            interactive,
            transport,
            api,
            prompter,
            Arc::new(store),
            Arc::new(repo),
        ))
    }

    /// Assemble a session from explicit parts.
    pub fn with_parts(
        verbosity: Verbosity,
        interactive: bool,
        transport: Transport,
        api: Arc<dyn ArgusApi>,
        prompter: Arc<dyn Prompter>,
        store: Arc<dyn ConfigStore>,
        repo: Arc<dyn RepoLocator>,
    ) -> Self {
        let handlers = Handlers::interactive(api.clone(), prompter.clone());
        Self {
            verbosity,
            interactive,
            api,
            prompter,
            store,
            repo,
            handlers,
            transport,
        }
    }

    /// API client authenticated with `token`.
    pub fn api_with_token(&self, token: &str) -> HttpApi {
        HttpApi::new(self.transport.clone().with_token(token))
    }

    pub fn load_config(&self) -> Result<Config> {
        self.store.load().context("failed to load config")
    }

    pub fn save_config(&self, config: &Config) -> Result<()> {
        self.store.save(config).context("failed to save config")
    }

    pub fn resolver(&self) -> Resolver {
        Resolver::new(
            self.api.clone(),
            self.prompter.clone(),
            self.repo.clone(),
            self.store.clone(),
            self.handlers.clone(),
        )
    }

    /// Load the config and resolve `request` against it.
    pub async fn resolve(&self, ctx: &Context, request: SetupRequest) -> Result<Resolved> {
        let config = self.load_config()?;
        Ok(self.resolver().resolve(ctx, request, config).await?)
    }
}

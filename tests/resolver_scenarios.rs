//! End-to-end scenarios for the command-state resolver.
//!
//! Each test wires the resolver to the in-memory API, a scripted prompter,
//! a fixed repo location, and a memory (or file) config store, then checks
//! the resolved state, the calls made, and what was persisted.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tempfile::TempDir;

use argus::api::mock::MockApi;
use argus::api::{Operation, Organization, OrganizationInvitation, Project, TransportError, User};
use argus::core::config::{Config, ConfigStore, Credential, FileConfigStore, MemoryConfigStore};
use argus::core::context::Context;
use argus::git::StaticRepoLocator;
use argus::setup::{
    EntityKind, Handlers, LoginRequirement, Requirement, Resolver, SetupError, SetupRequest,
};
use argus::ui::prompts::ScriptedPrompter;

// =============================================================================
// Fixtures
// =============================================================================

const REPO_URL: &str = "git@example.com:acme/mono.git";

struct Harness {
    api: Arc<MockApi>,
    prompter: Arc<ScriptedPrompter>,
    store: MemoryConfigStore,
    resolver: Resolver,
}

impl Harness {
    fn new(api: MockApi, answers: &[&str], repo: StaticRepoLocator) -> Self {
        Self::with_store(api, answers, repo, MemoryConfigStore::default())
    }

    fn with_store(
        api: MockApi,
        answers: &[&str],
        repo: StaticRepoLocator,
        store: MemoryConfigStore,
    ) -> Self {
        let api = Arc::new(api);
        let prompter = Arc::new(ScriptedPrompter::new(answers.iter().copied()));
        let handlers = Handlers::interactive(api.clone(), prompter.clone());
        let resolver = Resolver::new(
            api.clone(),
            prompter.clone(),
            Arc::new(repo),
            Arc::new(store.clone()),
            handlers,
        );
        Self {
            api,
            prompter,
            store,
            resolver,
        }
    }
}

fn logged_in_config() -> Config {
    Config {
        credential: Credential {
            token: "tok".into(),
            token_expires_at: Some(Utc::now() + Duration::days(1)),
            user_id: "u1".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
        },
        ..Default::default()
    }
}

fn user() -> User {
    User {
        id: "u1".into(),
        name: "Ada".into(),
        email: "ada@example.com".into(),
    }
}

fn org(id: &str, name: &str) -> Organization {
    Organization {
        id: id.into(),
        name: name.into(),
        slug: name.to_lowercase(),
    }
}

fn project(id: &str, name: &str, org_id: &str) -> Project {
    Project {
        id: id.into(),
        name: name.into(),
        slug: name.to_lowercase(),
        org_id: org_id.into(),
    }
}

fn request(org: Requirement, project: Requirement) -> SetupRequest {
    SetupRequest::new(LoginRequirement::NeedLogin, org, project)
}

// =============================================================================
// Baseline scenarios
// =============================================================================

#[tokio::test]
async fn nothing_required_saves_once() {
    let h = Harness::new(MockApi::new(), &[], StaticRepoLocator::new("", ""));

    let resolved = h
        .resolver
        .resolve(&Context::background(), SetupRequest::NONE, Config::default())
        .await
        .unwrap();

    assert!(!resolved.state.logged_in);
    assert!(resolved.state.user.is_none());
    assert!(resolved.state.organization.is_none());
    assert!(resolved.state.project.is_none());
    assert_eq!(h.store.save_count(), 1);
    assert!(h.api.calls().is_empty());
}

#[tokio::test]
async fn logged_in_user_without_invitations() {
    let h = Harness::new(
        MockApi::new().with_user(user()),
        &[],
        StaticRepoLocator::none(),
    );

    let resolved = h
        .resolver
        .resolve(
            &Context::background(),
            SetupRequest::login(),
            logged_in_config(),
        )
        .await
        .unwrap();

    assert!(resolved.state.logged_in);
    assert_eq!(resolved.state.user, Some(user()));
    assert_eq!(h.api.count(Operation::ListOrganizationInvitations), 1);
    assert_eq!(h.api.count(Operation::AcceptOrganizationInvitation), 0);
}

#[tokio::test]
async fn declining_organization_creation_cancels() {
    let h = Harness::new(
        MockApi::new().with_user(user()),
        &["n"],
        StaticRepoLocator::none(),
    );

    let err = h
        .resolver
        .resolve(
            &Context::background(),
            request(Requirement::NeedData, Requirement::Ignore),
            logged_in_config(),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SetupError::CreationCanceled {
            kind: EntityKind::Organization
        }
    ));
    assert_eq!(h.prompter.questions(), vec!["No organizations found. Create one? [Y/n]"]);
    assert_eq!(h.store.save_count(), 0);
    assert_eq!(h.api.count(Operation::CreateOrganization), 0);
}

#[tokio::test]
async fn known_repo_fetches_by_id_without_prompting() {
    let api = MockApi::new()
        .with_user(user())
        .with_organization(org("o1", "Acme"))
        .with_organization(org("o2", "Initech"))
        .with_project(project("p1", "api", "o1"))
        .with_project(project("p2", "web", "o1"));
    let h = Harness::new(api, &[], StaticRepoLocator::new(REPO_URL, "services/api"));
    let mut config = logged_in_config();
    config.add_known_project("p1", "api", "o1", REPO_URL, "services/api");

    let resolved = h
        .resolver
        .resolve(
            &Context::background(),
            request(Requirement::NeedData, Requirement::NeedData),
            config,
        )
        .await
        .unwrap();

    assert_eq!(resolved.state.organization, Some(org("o1", "Acme")));
    assert_eq!(resolved.state.project, Some(project("p1", "api", "o1")));
    assert_eq!(h.api.count(Operation::GetOrganization), 1);
    assert_eq!(h.api.count(Operation::GetProject), 1);
    assert_eq!(h.api.count(Operation::ListOrganizations), 0);
    assert_eq!(h.api.count(Operation::ListProjects), 0);
    assert_eq!(h.api.count(Operation::FindProjectByRepo), 0);
    assert!(h.prompter.questions().is_empty());
    assert!(resolved.config.repo.known);
}

// =============================================================================
// Login and invitations
// =============================================================================

#[tokio::test]
async fn expired_token_is_not_logged_in() {
    let h = Harness::new(MockApi::new().with_user(user()), &[], StaticRepoLocator::none());
    let mut config = logged_in_config();
    config.credential.token_expires_at = Some(Utc::now() - Duration::minutes(1));

    let err = h
        .resolver
        .resolve(&Context::background(), SetupRequest::login(), config)
        .await
        .unwrap_err();

    assert!(matches!(err, SetupError::NotLoggedIn));
    assert!(h.api.calls().is_empty());
    assert_eq!(h.store.save_count(), 0);
}

#[tokio::test]
async fn rejected_token_is_fatal() {
    let api = MockApi::new().with_user(user()).fail_on(
        Operation::GetUser,
        TransportError::Auth {
            status: 401,
            message: "revoked".into(),
        },
    );
    let h = Harness::new(api, &[], StaticRepoLocator::none());

    let err = h
        .resolver
        .resolve(
            &Context::background(),
            SetupRequest::login(),
            logged_in_config(),
        )
        .await
        .unwrap_err();

    assert!(err.is_auth());
    assert_eq!(h.store.save_count(), 0);
}

#[tokio::test]
async fn invitations_are_offered_one_by_one() {
    let api = MockApi::new()
        .with_user(user())
        .with_invitation(OrganizationInvitation {
            id: "inv_1".into(),
            organization_id: "o7".into(),
            organization_name: "Umbrella".into(),
            invited_by: "wesker".into(),
        })
        .with_invitation(OrganizationInvitation {
            id: "inv_2".into(),
            organization_id: "o8".into(),
            organization_name: "Cyberdyne".into(),
            invited_by: String::new(),
        });
    let h = Harness::new(api, &["y", "n"], StaticRepoLocator::none());

    h.resolver
        .resolve(
            &Context::background(),
            SetupRequest::login(),
            logged_in_config(),
        )
        .await
        .unwrap();

    assert_eq!(
        h.prompter.questions(),
        vec![
            "wesker invited you to join Umbrella. Accept? [Y/n]",
            "You have been invited to join Cyberdyne. Accept? [Y/n]",
        ]
    );
    assert_eq!(h.api.count(Operation::AcceptOrganizationInvitation), 1);
    assert_eq!(h.api.organizations(), vec![org("o7", "Umbrella")]);
}

#[tokio::test]
async fn invitation_accept_failure_aborts() {
    let api = MockApi::new()
        .with_user(user())
        .with_invitation(OrganizationInvitation {
            id: "inv_1".into(),
            organization_id: "o7".into(),
            organization_name: "Umbrella".into(),
            invited_by: "wesker".into(),
        })
        .fail_on(
            Operation::AcceptOrganizationInvitation,
            TransportError::Http {
                status: 410,
                message: "invitation expired".into(),
            },
        );
    let h = Harness::new(api, &["y"], StaticRepoLocator::none());

    let err = h
        .resolver
        .resolve(
            &Context::background(),
            SetupRequest::login(),
            logged_in_config(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, SetupError::Api(_)));
    assert_eq!(h.store.save_count(), 0);
}

#[tokio::test]
async fn ignore_login_skips_invitations() {
    let api = MockApi::new().with_invitation(OrganizationInvitation {
        id: "inv_1".into(),
        ..Default::default()
    });
    let h = Harness::new(api, &[], StaticRepoLocator::none());

    let resolved = h
        .resolver
        .resolve(
            &Context::background(),
            SetupRequest::NONE,
            logged_in_config(),
        )
        .await
        .unwrap();

    assert!(resolved.state.logged_in);
    assert!(h.api.calls().is_empty());
}

// =============================================================================
// Repo lookup
// =============================================================================

#[tokio::test]
async fn repo_lookup_links_and_persists_immediately() {
    let api = MockApi::new()
        .with_user(user())
        .with_organization(org("o1", "Acme"))
        .with_project(project("p1", "api", "o1"))
        .with_repo_link(REPO_URL, "services/api", "p1");
    let h = Harness::new(api, &[], StaticRepoLocator::new(REPO_URL, "services/api"));

    let resolved = h
        .resolver
        .resolve(
            &Context::background(),
            request(Requirement::NeedExistingIdOnly, Requirement::NeedExistingData),
            logged_in_config(),
        )
        .await
        .unwrap();

    assert_eq!(resolved.state.project, Some(project("p1", "api", "o1")));
    assert_eq!(resolved.config.organization_id, "o1");
    assert_eq!(h.api.count(Operation::FindProjectByRepo), 1);

    // One save right after the lookup, one at the end
    let saves = h.store.saves();
    assert_eq!(saves.len(), 2);
    let known = saves[0]
        .find_known_project(REPO_URL, "services/api")
        .expect("lookup result remembered");
    assert_eq!(known.project_id, "p1");
}

#[tokio::test]
async fn repo_lookup_save_failure_is_not_fatal_but_final_save_is() {
    let api = MockApi::new()
        .with_user(user())
        .with_organization(org("o1", "Acme"))
        .with_project(project("p1", "api", "o1"))
        .with_repo_link(REPO_URL, "", "p1");
    let store = MemoryConfigStore::default();
    store.fail_saves();
    let h = Harness::with_store(api, &[], StaticRepoLocator::new(REPO_URL, ""), store);

    let err = h
        .resolver
        .resolve(
            &Context::background(),
            request(Requirement::NeedExistingIdOnly, Requirement::NeedData),
            logged_in_config(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, SetupError::SaveConfig(_)));
    assert_eq!(err.to_string(), "failed to save config after setup");
    assert_eq!(h.store.save_count(), 2);
}

#[tokio::test]
async fn repo_lookup_requires_login() {
    let h = Harness::new(MockApi::new(), &[], StaticRepoLocator::new(REPO_URL, ""));
    let request = SetupRequest::new(
        LoginRequirement::Ignore,
        Requirement::Ignore,
        Requirement::NeedRepoLookup,
    );

    let err = h
        .resolver
        .resolve(&Context::background(), request, Config::default())
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "not logged in, can't lookup project from git repo"
    );
}

#[tokio::test]
async fn repo_lookup_without_match_yields_no_project() {
    let api = MockApi::new()
        .with_user(user())
        .with_organization(org("o1", "Acme"));
    let h = Harness::new(api, &[""], StaticRepoLocator::new(REPO_URL, ""));

    let resolved = h
        .resolver
        .resolve(
            &Context::background(),
            request(Requirement::NeedData, Requirement::NeedRepoLookup),
            logged_in_config(),
        )
        .await
        .unwrap();

    assert_eq!(resolved.state.organization_id(), Some("o1"));
    assert!(resolved.state.project.is_none());
    assert!(!resolved.config.repo.known);
    assert!(resolved.config.known_projects.is_empty());
}

#[tokio::test]
async fn known_project_match_is_exact() {
    let api = MockApi::new()
        .with_user(user())
        .with_organization(org("o1", "Acme"));
    let h = Harness::new(api, &[""], StaticRepoLocator::new(REPO_URL, "services/api/v2"));
    let mut config = logged_in_config();
    config.add_known_project("p1", "api", "o1", REPO_URL, "services/api");

    let resolved = h
        .resolver
        .resolve(
            &Context::background(),
            request(Requirement::NeedData, Requirement::NeedRepoLookup),
            config,
        )
        .await
        .unwrap();

    // Subdirectory of a known path is not a match; the server is asked instead
    assert!(!resolved.config.repo.known);
    assert_eq!(h.api.count(Operation::FindProjectByRepo), 1);
}

#[tokio::test]
async fn repo_lookup_requires_login_outside_repo() {
    let h = Harness::new(MockApi::new(), &[], StaticRepoLocator::none());
    let request = SetupRequest::new(
        LoginRequirement::Ignore,
        Requirement::Ignore,
        Requirement::NeedExistingIdOnly,
    );
    let config = Config {
        project_id: "p1".into(),
        ..Default::default()
    };

    let err = h
        .resolver
        .resolve(&Context::background(), request, config)
        .await
        .unwrap_err();

    assert!(matches!(err, SetupError::NotLoggedInForRepoLookup));
    assert!(h.api.calls().is_empty());
    assert_eq!(h.store.save_count(), 0);
}

#[tokio::test]
async fn lookup_match_without_organization_is_rejected() {
    let api = MockApi::new()
        .with_user(user())
        .with_organization(org("o1", "Acme"))
        .with_project(project("p1", "api", ""))
        .with_repo_link(REPO_URL, "", "p1");
    let h = Harness::new(api, &[], StaticRepoLocator::new(REPO_URL, ""));
    let mut config = logged_in_config();
    config.organization_id = "o_other".into();

    let err = h
        .resolver
        .resolve(
            &Context::background(),
            request(Requirement::NeedExistingIdOnly, Requirement::NeedData),
            config,
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SetupError::LookupWithoutOrganization { ref project } if project == "p1"
    ));
    assert_eq!(h.store.save_count(), 0);
}

// =============================================================================
// Stale known projects
// =============================================================================

#[tokio::test]
async fn deleted_known_project_falls_back_to_listing() {
    let api = MockApi::new()
        .with_user(user())
        .with_organization(org("o1", "Acme"))
        .with_project(project("p2", "web", "o1"));
    let h = Harness::new(api, &["y"], StaticRepoLocator::new(REPO_URL, "services/api"));
    let mut config = logged_in_config();
    config.add_known_project("p_deleted", "api", "o1", REPO_URL, "services/api");

    let resolved = h
        .resolver
        .resolve(
            &Context::background(),
            request(Requirement::NeedData, Requirement::NeedData),
            config,
        )
        .await
        .unwrap();

    assert_eq!(resolved.state.organization, Some(org("o1", "Acme")));
    assert_eq!(resolved.state.project, Some(project("p2", "web", "o1")));
    assert_eq!(resolved.config.project_id, "p2");

    // Each stale ID is fetched once, then the regular flow lists and prompts
    assert_eq!(h.api.count(Operation::GetOrganization), 1);
    assert_eq!(h.api.count(Operation::GetProject), 1);
    assert_eq!(h.api.count(Operation::ListProjects), 1);
    assert_eq!(h.api.count(Operation::ListOrganizations), 0);
    assert_eq!(h.prompter.questions().len(), 1);

    let saved = h.store.saves().pop().unwrap();
    assert!(saved.find_known_project(REPO_URL, "services/api").is_none());
}

#[tokio::test]
async fn deleted_known_organization_falls_back_to_listing() {
    let api = MockApi::new()
        .with_user(user())
        .with_organization(org("o1", "Acme"))
        .with_project(project("p1", "api", "o1"));
    let h = Harness::new(api, &["y", "y"], StaticRepoLocator::new(REPO_URL, ""));
    let mut config = logged_in_config();
    config.add_known_project("p1", "api", "o_gone", REPO_URL, "");

    let resolved = h
        .resolver
        .resolve(
            &Context::background(),
            request(Requirement::NeedData, Requirement::NeedData),
            config,
        )
        .await
        .unwrap();

    assert_eq!(resolved.config.organization_id, "o1");
    assert_eq!(resolved.state.project, Some(project("p1", "api", "o1")));
    assert_eq!(h.api.count(Operation::GetOrganization), 1);
    assert_eq!(h.api.count(Operation::GetProject), 0);
    assert_eq!(h.api.count(Operation::ListOrganizations), 1);
    assert_eq!(h.api.count(Operation::ListProjects), 1);
    assert!(resolved.config.known_projects.is_empty());
}

#[tokio::test]
async fn known_project_auth_failure_is_fatal() {
    let api = MockApi::new()
        .with_user(user())
        .with_organization(org("o1", "Acme"))
        .with_project(project("p1", "api", "o1"))
        .fail_on(
            Operation::GetProject,
            TransportError::Auth {
                status: 403,
                message: "forbidden".into(),
            },
        );
    let h = Harness::new(api, &[], StaticRepoLocator::new(REPO_URL, ""));
    let mut config = logged_in_config();
    config.add_known_project("p1", "api", "o1", REPO_URL, "");

    let err = h
        .resolver
        .resolve(
            &Context::background(),
            request(Requirement::NeedData, Requirement::NeedData),
            config,
        )
        .await
        .unwrap_err();

    assert!(err.is_auth());
    assert_eq!(h.api.count(Operation::ListProjects), 0);
    assert_eq!(h.store.save_count(), 0);
}

// =============================================================================
// Creation flows
// =============================================================================

#[tokio::test]
async fn creates_organization_and_project_inside_repo() {
    let h = Harness::new(
        MockApi::new().with_user(user()),
        &["y", "Acme", "y", ""],
        StaticRepoLocator::new(REPO_URL, "services/billing"),
    );

    let resolved = h
        .resolver
        .resolve(
            &Context::background(),
            request(Requirement::NeedData, Requirement::NeedData),
            logged_in_config(),
        )
        .await
        .unwrap();

    let org = resolved.state.organization.unwrap();
    let project = resolved.state.project.unwrap();
    assert_eq!(org.name, "Acme");
    assert_eq!(project.name, "billing");
    assert_eq!(project.org_id, org.id);
    assert_eq!(resolved.config.organization_id, org.id);
    assert_eq!(resolved.config.project_id, project.id);

    let saved = h.store.saves().pop().unwrap();
    assert_eq!(saved.organization_id, org.id);
    assert_eq!(saved.project_id, project.id);
}

#[tokio::test]
async fn file_store_round_trip_after_resolution() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(FileConfigStore::with_path(dir.path().join("config.json")));
    let api = Arc::new(
        MockApi::new()
            .with_user(user())
            .with_organization(org("o1", "Acme")),
    );
    let prompter = Arc::new(ScriptedPrompter::new(["y"]));
    let resolver = Resolver::new(
        api.clone(),
        prompter.clone(),
        Arc::new(StaticRepoLocator::new(REPO_URL, "")),
        store.clone(),
        Handlers::interactive(api.clone(), prompter.clone()),
    );

    resolver
        .resolve(
            &Context::background(),
            request(Requirement::NeedIdOnly, Requirement::Ignore),
            logged_in_config(),
        )
        .await
        .unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded.organization_id, "o1");
    assert_eq!(loaded.credential.token, "tok");
    // Transient repo fields are recomputed per run, never persisted
    assert!(loaded.repo.url.is_empty());
    let raw = std::fs::read_to_string(dir.path().join("config.json")).unwrap();
    assert!(!raw.contains(REPO_URL));
}

// =============================================================================
// Cancellation
// =============================================================================

#[tokio::test]
async fn cancelled_context_saves_nothing() {
    let api = MockApi::new()
        .with_user(user())
        .with_organization(org("o1", "Acme"))
        .with_organization(org("o2", "Initech"));
    let h = Harness::new(api, &[], StaticRepoLocator::none());
    let (ctx, handle) = Context::with_cancel();
    handle.cancel();
    let err = h
        .resolver
        .resolve(
            &ctx,
            request(Requirement::NeedData, Requirement::Ignore),
            logged_in_config(),
        )
        .await
        .unwrap_err();

    assert!(err.is_canceled());
    assert!(h.api.calls().is_empty());
    assert_eq!(h.store.save_count(), 0);
}

//! setup::state
//!
//! The resolved context a command runs against.

use crate::api::{Organization, Project, User};

/// Resolver output.
///
/// Each entity is `None` when its requirement was `Ignore` (or when a repo
/// lookup found nothing), `Some` otherwise. ID-only requirements yield stubs
/// carrying just the ID (and, for projects, the name).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandState {
    pub logged_in: bool,
    pub user: Option<User>,
    pub organization: Option<Organization>,
    pub project: Option<Project>,
}

impl CommandState {
    /// Organization ID, if resolved.
    pub fn organization_id(&self) -> Option<&str> {
        self.organization.as_ref().map(|org| org.id.as_str())
    }

    /// Project ID, if resolved.
    pub fn project_id(&self) -> Option<&str> {
        self.project.as_ref().map(|project| project.id.as_str())
    }
}

pub(crate) fn organization_stub(id: &str) -> Organization {
    Organization {
        id: id.to_string(),
        ..Default::default()
    }
}

pub(crate) fn project_stub(id: &str, name: &str, organization_id: &str) -> Project {
    Project {
        id: id.to_string(),
        name: name.to_string(),
        org_id: organization_id.to_string(),
        ..Default::default()
    }
}

//! git::locator
//!
//! Locate the current git working tree and its remote.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Errors from repository discovery.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// The repository has no remote to identify it by.
    #[error("repository has no remote")]
    NoRemote,

    /// Could not determine the current directory.
    #[error("repository access error: {message}")]
    AccessError {
        /// Description of the error
        message: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        GitError::Internal {
            message: err.message().to_string(),
        }
    }
}

/// Where the current directory sits inside a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoLocation {
    /// Subdirectory relative to the working tree root, `/`-separated.
    /// Empty at the root.
    pub path: String,
    /// URL of the remote the repo is identified by.
    pub url: String,
}

/// Source of the current repo location.
pub trait RepoLocator: Send + Sync {
    fn find_git_path_and_url(&self) -> Result<RepoLocation, GitError>;
}

/// git2-backed locator rooted at a directory (usually the cwd).
#[derive(Debug, Clone)]
pub struct Git2Locator {
    start: Option<PathBuf>,
}

impl Git2Locator {
    /// Locate from the process working directory.
    pub fn current_dir() -> Self {
        Self { start: None }
    }

    /// Locate from `path`.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            start: Some(path.into()),
        }
    }

    fn start(&self) -> Result<PathBuf, GitError> {
        match &self.start {
            Some(path) => Ok(path.clone()),
            None => std::env::current_dir().map_err(|e| GitError::AccessError {
                message: e.to_string(),
            }),
        }
    }
}

impl RepoLocator for Git2Locator {
    fn find_git_path_and_url(&self) -> Result<RepoLocation, GitError> {
        let start = self.start()?;
        let repo = git2::Repository::discover(&start)
            .map_err(|_| GitError::NotARepo { path: start.clone() })?;
        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }
        let workdir = repo.workdir().ok_or(GitError::BareRepo)?;

        let url = remote_url(&repo)?.ok_or(GitError::NoRemote)?;
        let path = relative_path(workdir, &start);

        Ok(RepoLocation { path, url })
    }
}

/// URL of "origin", else of the first remote.
fn remote_url(repo: &git2::Repository) -> Result<Option<String>, GitError> {
    let remotes = repo.remotes()?;
    let name = remotes
        .iter()
        .flatten()
        .find(|name| *name == "origin")
        .or_else(|| remotes.iter().flatten().next());

    let Some(name) = name else {
        return Ok(None);
    };
    let remote = repo.find_remote(name)?;
    Ok(remote.url().map(String::from))
}

/// `start` relative to `workdir` with `/` separators; empty at the root.
fn relative_path(workdir: &Path, start: &Path) -> String {
    let workdir = workdir.canonicalize().unwrap_or_else(|_| workdir.to_path_buf());
    let start = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());

    match start.strip_prefix(&workdir) {
        Ok(rel) => rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => String::new(),
    }
}

/// Fixed answer; for tests.
#[derive(Debug, Clone)]
pub struct StaticRepoLocator {
    location: Option<RepoLocation>,
}

impl StaticRepoLocator {
    /// Always report `url` and `path`.
    pub fn new(url: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            location: Some(RepoLocation {
                path: path.into(),
                url: url.into(),
            }),
        }
    }

    /// Always report "not a repository".
    pub fn none() -> Self {
        Self { location: None }
    }
}

impl RepoLocator for StaticRepoLocator {
    fn find_git_path_and_url(&self) -> Result<RepoLocation, GitError> {
        self.location.clone().ok_or_else(|| GitError::NotARepo {
            path: PathBuf::from("."),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn init_repo(remotes: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        let repo = git2::Repository::init(dir.path()).unwrap();
        for (name, url) in remotes {
            repo.remote(name, url).unwrap();
        }
        dir
    }

    #[test]
    fn root_has_empty_path() {
        let dir = init_repo(&[("origin", "git@example.com:acme/api.git")]);

        let location = Git2Locator::at(dir.path()).find_git_path_and_url().unwrap();

        assert_eq!(location.url, "git@example.com:acme/api.git");
        assert_eq!(location.path, "");
    }

    #[test]
    fn subdirectory_path_uses_slashes() {
        let dir = init_repo(&[("origin", "https://example.com/acme/mono.git")]);
        let sub = dir.path().join("services").join("billing");
        std::fs::create_dir_all(&sub).unwrap();

        let location = Git2Locator::at(&sub).find_git_path_and_url().unwrap();

        assert_eq!(location.path, "services/billing");
    }

    #[test]
    fn prefers_origin() {
        let dir = init_repo(&[
            ("upstream", "https://up.example/x.git"),
            ("origin", "https://o.example/x.git"),
        ]);

        let location = Git2Locator::at(dir.path()).find_git_path_and_url().unwrap();

        assert_eq!(location.url, "https://o.example/x.git");
    }

    #[test]
    fn falls_back_to_first_remote() {
        let dir = init_repo(&[("upstream", "https://up.example/x.git")]);

        let location = Git2Locator::at(dir.path()).find_git_path_and_url().unwrap();

        assert_eq!(location.url, "https://up.example/x.git");
    }

    #[test]
    fn no_remote_is_an_error() {
        let dir = init_repo(&[]);
        let err = Git2Locator::at(dir.path())
            .find_git_path_and_url()
            .unwrap_err();
        assert!(matches!(err, GitError::NoRemote));
    }

    #[test]
    fn outside_repo_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = Git2Locator::at(dir.path())
            .find_git_path_and_url()
            .unwrap_err();
        assert!(matches!(err, GitError::NotARepo { .. }));
    }

    #[test]
    fn static_locator() {
        let located = StaticRepoLocator::new("url", "sub")
            .find_git_path_and_url()
            .unwrap();
        assert_eq!(located.url, "url");
        assert_eq!(located.path, "sub");
        assert!(StaticRepoLocator::none().find_git_path_and_url().is_err());
    }
}

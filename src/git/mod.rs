//! git
//!
//! Repository introspection.
//!
//! # Architecture
//!
//! This module is the only place that imports `git2`. The resolver asks a
//! [`RepoLocator`] where the current directory sits: the remote URL that
//! identifies the repository, and the subdirectory relative to the working
//! tree root. Together they key the known-project mapping.
//!
//! # Example
//!
//! ```ignore
//! use argus::git::{Git2Locator, RepoLocator};
//!
//! let location = Git2Locator::current_dir().find_git_path_and_url()?;
//! println!("{} at {:?}", location.url, location.path);
//! ```

mod locator;

pub use locator::{Git2Locator, GitError, RepoLocation, RepoLocator, StaticRepoLocator};

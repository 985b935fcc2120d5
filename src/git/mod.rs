//! Git operations abstraction layer
//!
//! The [Repository] trait covers what a release needs from git: reading the
//! commits since the last release tag, checking the working tree, and
//! creating the release commit and tag.
//!
//! - [repository::Git2Repository]: reads history with `git2`, writes with the `git` CLI
//! - [mock::MockRepository]: in-memory implementation for tests
//!
//! ```rust
//! # use version_bump::git::{Repository, tag_pattern};
//! # fn example<R: Repository>(repo: &R) -> version_bump::Result<()> {
//! let last = repo.last_tag(&tag_pattern("v%s"))?;
//! let commits = repo.commits_since(last.as_deref())?;
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use std::path::PathBuf;

use crate::conventional::RawCommit;
use crate::error::Result;

const VERSION_PLACEHOLDER: &str = "%s";

/// A release commit to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRequest {
    pub message: String,
    /// Files to commit; ignored when `all` is set
    pub files: Vec<PathBuf>,
    pub all: bool,
    pub no_verify: bool,
    pub sign: bool,
}

/// An annotated release tag to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRequest {
    pub name: String,
    pub message: String,
    pub sign: bool,
}

/// Common git operation trait for abstraction
///
/// All implementors must be `Send + Sync`. Methods return
/// [crate::error::Result]; `git2` failures map to `BumpError::Git` and
/// failed `git` invocations to `BumpError::Command`.
pub trait Repository: Send + Sync {
    /// Most recent tag reachable from HEAD that matches a glob pattern
    ///
    /// # Returns
    /// * `Ok(Some(name))` - The closest matching tag
    /// * `Ok(None)` - If no tag matches
    fn last_tag(&self, pattern: &str) -> Result<Option<String>>;

    /// Commits reachable from HEAD but not from `since`, newest first
    ///
    /// Without a tag, the whole history except the root commit is returned.
    fn commits_since(&self, since: Option<&str>) -> Result<Vec<RawCommit>>;

    /// Paths with uncommitted changes, including untracked files
    fn dirty_files(&self) -> Result<Vec<String>>;

    /// Create the release commit
    fn commit(&self, request: &CommitRequest) -> Result<()>;

    /// Create an annotated tag on HEAD
    fn tag(&self, request: &TagRequest) -> Result<()>;

    /// Push the current branch, and tags when `tags` is set
    fn push(&self, tags: bool) -> Result<()>;
}

/// Fill a commit message or tag name template with the version.
///
/// Every `%s` is replaced; a template without `%s` gets the version appended.
pub fn format_version_string(template: &str, version: &str) -> String {
    if template.contains(VERSION_PLACEHOLDER) {
        template.replace(VERSION_PLACEHOLDER, version)
    } else {
        format!("{}{}", template, version)
    }
}

/// Glob matching every tag a tag name template can produce
pub fn tag_pattern(template: &str) -> String {
    if template.contains(VERSION_PLACEHOLDER) {
        template.replace(VERSION_PLACEHOLDER, "*")
    } else {
        format!("{}*", template)
    }
}

use std::sync::Mutex;

use crate::conventional::RawCommit;
use crate::error::{BumpError, Result};
use crate::git::{CommitRequest, Repository, TagRequest};

/// A write made against a [`MockRepository`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCall {
    Commit(CommitRequest),
    Tag(TagRequest),
    Push { tags: bool },
}

/// Mock repository for testing without actual git operations
pub struct MockRepository {
    /// Tag names with the number of commits in history when they were made
    tags: Vec<(String, usize)>,
    commits: Vec<RawCommit>,
    dirty: Vec<String>,
    fail_push: bool,
    calls: Mutex<Vec<GitCall>>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        MockRepository {
            tags: Vec::new(),
            commits: Vec::new(),
            dirty: Vec::new(),
            fail_push: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Tag the current head; later tags are considered closer to HEAD
    pub fn add_tag(&mut self, name: impl Into<String>) {
        self.tags.push((name.into(), self.commits.len()));
    }

    /// Add a commit on top of the history
    pub fn add_commit(&mut self, commit: RawCommit) {
        self.commits.push(commit);
    }

    /// Mark a path as modified in the working tree
    pub fn add_dirty_file(&mut self, path: impl Into<String>) {
        self.dirty.push(path.into());
    }

    /// Make every push fail
    pub fn fail_push(&mut self) {
        self.fail_push = true;
    }

    /// Writes recorded so far, in order
    pub fn calls(&self) -> Vec<GitCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn record(&self, call: GitCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn glob_match(pattern: &str, name: &str) -> bool {
    glob::Pattern::new(pattern)
        .map(|p| p.matches(name))
        .unwrap_or(false)
}

impl Repository for MockRepository {
    fn last_tag(&self, pattern: &str) -> Result<Option<String>> {
        Ok(self
            .tags
            .iter()
            .rev()
            .map(|(name, _)| name)
            .find(|name| glob_match(pattern, name))
            .cloned())
    }

    fn commits_since(&self, since: Option<&str>) -> Result<Vec<RawCommit>> {
        let start = match since {
            Some(tag) => self
                .tags
                .iter()
                .find(|(name, _)| name == tag)
                .map(|(_, position)| *position)
                .ok_or_else(|| BumpError::command(format!("unknown revision '{}'", tag)))?,
            None => 0,
        };
        Ok(self.commits[start..].iter().rev().cloned().collect())
    }

    fn dirty_files(&self) -> Result<Vec<String>> {
        Ok(self.dirty.clone())
    }

    fn commit(&self, request: &CommitRequest) -> Result<()> {
        self.record(GitCall::Commit(request.clone()));
        Ok(())
    }

    fn tag(&self, request: &TagRequest) -> Result<()> {
        self.record(GitCall::Tag(request.clone()));
        Ok(())
    }

    fn push(&self, tags: bool) -> Result<()> {
        if self.fail_push {
            return Err(BumpError::command("git push exited with code 1"));
        }
        self.record(GitCall::Push { tags });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_tag_prefers_latest_match() {
        let mut repo = MockRepository::new();
        repo.add_tag("v1.0.0");
        repo.add_tag("other-2.0.0");
        repo.add_tag("v1.1.0");

        assert_eq!(repo.last_tag("v*").unwrap(), Some("v1.1.0".into()));
        assert_eq!(repo.last_tag("other-*").unwrap(), Some("other-2.0.0".into()));
        assert_eq!(repo.last_tag("pkg@*").unwrap(), None);
    }

    fn commit(message: &str) -> RawCommit {
        RawCommit {
            message: message.into(),
            body: String::new(),
            short_hash: "0000000".into(),
            author: crate::conventional::Author {
                name: "Jane Doe".into(),
                email: "jane@example.com".into(),
            },
        }
    }

    #[test]
    fn test_commits_since_tag_newest_first() {
        let mut repo = MockRepository::new();
        repo.add_commit(commit("feat!: old breaking change"));
        repo.add_tag("v1.0.0");
        repo.add_commit(commit("fix: a"));
        repo.add_commit(commit("feat: b"));

        let since: Vec<String> = repo
            .commits_since(Some("v1.0.0"))
            .unwrap()
            .into_iter()
            .map(|c| c.message)
            .collect();
        assert_eq!(since, vec!["feat: b", "fix: a"]);
        assert_eq!(repo.commits_since(None).unwrap().len(), 3);
        assert!(repo.commits_since(Some("v9.9.9")).is_err());
    }

    #[test]
    fn test_writes_are_recorded() {
        let repo = MockRepository::default();
        repo.tag(&TagRequest {
            name: "v1.0.0".into(),
            message: "v1.0.0".into(),
            sign: false,
        })
        .unwrap();
        repo.push(true).unwrap();

        assert_eq!(repo.calls().len(), 2);
        assert_eq!(repo.calls()[1], GitCall::Push { tags: true });
    }

    #[test]
    fn test_push_failure() {
        let mut repo = MockRepository::new();
        repo.fail_push();
        assert!(matches!(repo.push(false), Err(BumpError::Command(_))));
        assert!(repo.calls().is_empty());
    }
}

use git2::{DescribeFormatOptions, DescribeOptions, ErrorCode, Repository as Git2Repo, Sort};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::command::{commit_args, run_git, tag_args};
use super::{CommitRequest, TagRequest};
use crate::conventional::{Author, RawCommit};
use crate::error::{BumpError, Result};

/// Repository backed by `git2` for reads and the `git` CLI for writes.
///
/// Commits and tags go through the CLI so that hooks, signing and the
/// user's git configuration apply exactly as they would by hand.
pub struct Git2Repository {
    repo: Mutex<Git2Repo>,
    cwd: PathBuf,
}

impl Git2Repository {
    /// Open or discover a git repository; `git` commands run in `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path.as_ref())?;
        Ok(Self::from_git2(repo, path.as_ref()))
    }

    /// Create from existing git2::Repository; `cwd` is where `git` runs
    pub fn from_git2(repo: Git2Repo, cwd: &Path) -> Self {
        Git2Repository {
            repo: Mutex::new(repo),
            cwd: cwd.to_path_buf(),
        }
    }

    fn repo(&self) -> Result<MutexGuard<'_, Git2Repo>> {
        self.repo
            .lock()
            .map_err(|_| BumpError::command("git repository lock poisoned"))
    }
}

fn not_found(e: &git2::Error) -> bool {
    matches!(e.code(), ErrorCode::NotFound | ErrorCode::UnbornBranch)
}

impl super::Repository for Git2Repository {
    fn last_tag(&self, pattern: &str) -> Result<Option<String>> {
        let repo = self.repo()?;
        let mut options = DescribeOptions::new();
        options.describe_tags().pattern(pattern);

        let describe = match repo.describe(&options) {
            Ok(describe) => describe,
            Err(e) if not_found(&e) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut format = DescribeFormatOptions::new();
        format.abbreviated_size(0);
        Ok(Some(describe.format(Some(&format))?))
    }

    fn commits_since(&self, since: Option<&str>) -> Result<Vec<RawCommit>> {
        let repo = self.repo()?;
        let mut revwalk = repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;

        match revwalk.push_head() {
            Ok(()) => {}
            Err(e) if not_found(&e) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        }

        if let Some(tag) = since {
            let boundary = repo.revparse_single(tag)?.peel_to_commit()?;
            revwalk.hide(boundary.id())?;
        }

        let mut commits = Vec::new();
        for oid in revwalk {
            let commit = repo.find_commit(oid?)?;

            if since.is_none() && commit.parent_count() == 0 {
                continue;
            }

            let short_hash = commit
                .as_object()
                .short_id()?
                .as_str()
                .unwrap_or_default()
                .to_string();
            let author = commit.author();

            commits.push(RawCommit {
                message: commit.summary().unwrap_or_default().to_string(),
                body: commit.body().unwrap_or_default().trim().to_string(),
                short_hash,
                author: Author {
                    name: author.name().unwrap_or("unknown").to_string(),
                    email: author.email().unwrap_or_default().to_string(),
                },
            });
        }

        Ok(commits)
    }

    fn dirty_files(&self) -> Result<Vec<String>> {
        let repo = self.repo()?;
        let mut options = git2::StatusOptions::new();
        options.include_untracked(true).include_ignored(false);

        let statuses = repo.statuses(Some(&mut options))?;
        Ok(statuses
            .iter()
            .filter(|entry| !entry.status().is_ignored())
            .filter_map(|entry| entry.path().map(str::to_string))
            .collect())
    }

    fn commit(&self, request: &CommitRequest) -> Result<()> {
        run_git(&self.cwd, &commit_args(request))?;
        Ok(())
    }

    fn tag(&self, request: &TagRequest) -> Result<()> {
        run_git(&self.cwd, &tag_args(request))?;
        Ok(())
    }

    fn push(&self, tags: bool) -> Result<()> {
        run_git(&self.cwd, &["push"])?;
        if tags {
            run_git(&self.cwd, &["push", "--tags"])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::Repository;
    use std::fs;
    use tempfile::TempDir;

    fn commit_file(repo: &Git2Repo, name: &str, message: &str) -> git2::Oid {
        let workdir = repo.workdir().unwrap();
        fs::write(workdir.join(name), message).unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

        let signature = git2::Signature::now("Jane Doe", "jane@example.com").unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .unwrap()
    }

    fn tag_head(repo: &Git2Repo, name: &str) {
        let head = repo.head().unwrap().peel(git2::ObjectType::Commit).unwrap();
        let signature = git2::Signature::now("Jane Doe", "jane@example.com").unwrap();
        repo.tag(name, &head, &signature, name, false).unwrap();
    }

    fn setup() -> (TempDir, Git2Repository) {
        let dir = TempDir::new().unwrap();
        let raw = Git2Repo::init(dir.path()).unwrap();
        commit_file(&raw, "a.txt", "chore: initial commit");
        tag_head(&raw, "v1.0.0");
        commit_file(&raw, "b.txt", "feat(core): add b\n\nCloses #3");
        commit_file(&raw, "c.txt", "fix: handle c");
        let repo = Git2Repository::open(dir.path()).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_last_tag_matches_pattern() {
        let (_dir, repo) = setup();
        assert_eq!(repo.last_tag("v*").unwrap(), Some("v1.0.0".to_string()));
        assert_eq!(repo.last_tag("pkg@*").unwrap(), None);
    }

    #[test]
    fn test_commits_since_tag() {
        let (_dir, repo) = setup();
        let commits = repo.commits_since(Some("v1.0.0")).unwrap();

        let subjects: Vec<&str> = commits.iter().map(|c| c.message.as_str()).collect();
        assert_eq!(subjects, vec!["fix: handle c", "feat(core): add b"]);
        assert_eq!(commits[1].body, "Closes #3");
        assert_eq!(commits[1].author.email, "jane@example.com");
        assert!(!commits[0].short_hash.is_empty());
    }

    #[test]
    fn test_commits_without_tag_skip_root() {
        let (_dir, repo) = setup();
        let commits = repo.commits_since(None).unwrap();
        assert_eq!(commits.len(), 2);
    }

    #[test]
    fn test_empty_repository_has_no_history() {
        let dir = TempDir::new().unwrap();
        Git2Repo::init(dir.path()).unwrap();
        let repo = Git2Repository::open(dir.path()).unwrap();

        assert_eq!(repo.last_tag("v*").unwrap(), None);
        assert!(repo.commits_since(None).unwrap().is_empty());
    }

    #[test]
    fn test_dirty_files_lists_untracked() {
        let (dir, repo) = setup();
        assert!(repo.dirty_files().unwrap().is_empty());

        fs::write(dir.path().join("new.txt"), "x").unwrap();
        fs::write(dir.path().join("a.txt"), "changed").unwrap();

        let mut dirty = repo.dirty_files().unwrap();
        dirty.sort();
        assert_eq!(dirty, vec!["a.txt".to_string(), "new.txt".to_string()]);
    }
}

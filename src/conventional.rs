//! Conventional commit parsing and release classification.
//!
//! [`parse_commits`] reads `git log --pretty='----%n%s|%h|%an|%ae%n%b'` output:
//! a `----` boundary line, then `subject|short hash|author name|author email`,
//! then the body.

use std::sync::LazyLock;

use regex::Regex;

use crate::release::ReleaseType;

const COMMIT_BOUNDARY: &str = "----\n";

static SUBJECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:(?P<emoji>:[^:\s]+:|[\x{1F300}-\x{1FAFF}\x{2600}-\x{2B55}]) *)?(?P<type>[a-z]+)(?:\((?P<scope>[^)]+)\))?(?P<breaking>!)?: (?P<description>.+)",
    )
    .expect("Invalid regex")
});

static BREAKING_BODY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^breaking[ -]change:").expect("Invalid regex"));

static PULL_REQUEST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\([ a-z]*(#\d+)\s*\)").expect("Invalid regex"));

static ISSUE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#\d+").expect("Invalid regex"));

static CO_AUTHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*co-authored-by:\s*(?P<name>[^<\n]+)<(?P<email>[^>\n]+)>")
        .expect("Invalid regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceType {
    Hash,
    Issue,
    PullRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub kind: ReferenceType,
    pub value: String,
}

impl Reference {
    fn new(kind: ReferenceType, value: impl Into<String>) -> Self {
        Reference {
            kind,
            value: value.into(),
        }
    }
}

/// A commit as read from the log, before conventional parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommit {
    pub message: String,
    pub body: String,
    pub short_hash: String,
    pub author: Author,
}

/// A parsed conventional commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCommit {
    pub short_hash: String,
    /// Subject line as written
    pub message: String,
    pub body: String,
    /// Subject text after the type prefix, without pull-request references
    pub description: String,
    pub r#type: String,
    pub scope: Option<String>,
    pub is_breaking: bool,
    pub references: Vec<Reference>,
    /// Primary author first, then one entry per `Co-authored-by` trailer
    pub authors: Vec<Author>,
}

/// Split raw log text into commits. Text before the first boundary is ignored.
pub fn split_raw_commits(log: &str) -> Vec<RawCommit> {
    log.split(COMMIT_BOUNDARY)
        .skip(1)
        .map(|block| {
            let (header, body) = block.split_once('\n').unwrap_or((block, ""));
            let mut fields = header.splitn(4, '|');
            let mut next = || fields.next().unwrap_or("").to_string();
            let message = next();
            let short_hash = next();
            let name = next();
            let email = next();

            RawCommit {
                message,
                body: body.trim().to_string(),
                short_hash,
                author: Author { name, email },
            }
        })
        .collect()
}

/// Parse one raw commit; `None` when the subject is not a conventional commit.
pub fn parse_git_commit(commit: &RawCommit) -> Option<GitCommit> {
    let captures = SUBJECT_RE.captures(&commit.message)?;

    let r#type = captures.name("type")?.as_str().to_string();
    let scope = captures.name("scope").map(|m| m.as_str().to_string());
    let mut description = captures
        .name("description")
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    let is_breaking =
        captures.name("breaking").is_some() || BREAKING_BODY_RE.is_match(&commit.body);

    let mut references: Vec<Reference> = PULL_REQUEST_RE
        .captures_iter(&description)
        .filter_map(|c| c.get(1))
        .map(|m| Reference::new(ReferenceType::PullRequest, m.as_str()))
        .collect();

    for issue in ISSUE_RE.find_iter(&description) {
        if !references.iter().any(|r| r.value == issue.as_str()) {
            references.push(Reference::new(ReferenceType::Issue, issue.as_str()));
        }
    }
    references.push(Reference::new(ReferenceType::Hash, &commit.short_hash));

    description = PULL_REQUEST_RE
        .replace_all(&description, "")
        .trim()
        .to_string();

    let mut authors = vec![commit.author.clone()];
    authors.extend(CO_AUTHOR_RE.captures_iter(&commit.body).map(|c| Author {
        name: c["name"].trim().to_string(),
        email: c["email"].trim().to_string(),
    }));

    Some(GitCommit {
        short_hash: commit.short_hash.clone(),
        message: commit.message.clone(),
        body: commit.body.clone(),
        description,
        r#type,
        scope,
        is_breaking,
        references,
        authors,
    })
}

/// Parse `git log` output into conventional commits, preserving log order.
///
/// Commits whose subject doesn't follow the convention are dropped.
pub fn parse_commits(log: &str) -> Vec<GitCommit> {
    split_raw_commits(log)
        .iter()
        .filter_map(parse_git_commit)
        .collect()
}

/// Infer the release kind a set of commits calls for
pub fn determine_semver_change(commits: &[GitCommit]) -> ReleaseType {
    if commits.iter().any(|c| c.is_breaking) {
        ReleaseType::Major
    } else if commits.iter().any(|c| c.r#type == "feat") {
        ReleaseType::Minor
    } else {
        ReleaseType::Patch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(message: &str, body: &str) -> RawCommit {
        RawCommit {
            message: message.to_string(),
            body: body.to_string(),
            short_hash: "abc1234".to_string(),
            author: Author {
                name: "Jane".to_string(),
                email: "jane@example.com".to_string(),
            },
        }
    }

    #[test]
    fn test_parse_scope_and_breaking_marker() {
        let commit = parse_git_commit(&raw("feat(cli)!: drop node 14", "")).unwrap();
        assert_eq!(commit.r#type, "feat");
        assert_eq!(commit.scope.as_deref(), Some("cli"));
        assert!(commit.is_breaking);
        assert_eq!(commit.description, "drop node 14");
    }

    #[test]
    fn test_breaking_change_footer() {
        let commit = parse_git_commit(&raw(
            "refactor: rename option",
            "Some context\n\nBREAKING CHANGE: `foo` is now `bar`",
        ))
        .unwrap();
        assert!(commit.is_breaking);

        let commit = parse_git_commit(&raw("fix: x", "breaking-change: yes")).unwrap();
        assert!(commit.is_breaking);

        let commit = parse_git_commit(&raw("fix: x", "not a breaking change: really")).unwrap();
        assert!(!commit.is_breaking);
    }

    #[test]
    fn test_emoji_prefix() {
        let commit = parse_git_commit(&raw(":sparkles: feat: shiny", "")).unwrap();
        assert_eq!(commit.r#type, "feat");
        assert_eq!(commit.description, "shiny");

        let commit = parse_git_commit(&raw("🐛 fix: crash", "")).unwrap();
        assert_eq!(commit.r#type, "fix");
    }

    #[test]
    fn test_non_conventional_subject_is_dropped() {
        assert!(parse_git_commit(&raw("Merge pull request #12 from x/y", "")).is_none());
        assert!(parse_git_commit(&raw("update readme", "")).is_none());
    }

    #[test]
    fn test_same_number_pr_and_issue_deduplicated() {
        let commit = parse_git_commit(&raw("fix: crash (#12), see #12", "")).unwrap();
        let kinds: Vec<_> = commit.references.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![ReferenceType::PullRequest, ReferenceType::Hash]);
        assert_eq!(commit.description, "crash , see #12");
    }

    #[test]
    fn test_co_authors_keep_duplicates() {
        let body = "Co-authored-by: A <a@x.io>\nco-authored-by: A <a@x.io>";
        let commit = parse_git_commit(&raw("chore: pair", body)).unwrap();
        assert_eq!(commit.authors.len(), 3);
        assert_eq!(commit.authors[1], commit.authors[2]);
        assert_eq!(commit.authors[1].name, "A");
    }

    #[test]
    fn test_header_with_missing_fields() {
        let commits = split_raw_commits("----\nfix: x|1eda378|someone\n");
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].author.name, "someone");
        assert_eq!(commits[0].author.email, "");
        assert_eq!(commits[0].body, "");
    }

    #[test]
    fn test_determine_semver_change() {
        let feat = parse_git_commit(&raw("feat: a", "")).unwrap();
        let fix = parse_git_commit(&raw("fix: b", "")).unwrap();
        let chore = parse_git_commit(&raw("chore: c", "")).unwrap();
        let breaking = parse_git_commit(&raw("fix!: d", "")).unwrap();

        assert_eq!(
            determine_semver_change(&[feat.clone(), breaking, feat.clone()]),
            ReleaseType::Major
        );
        assert_eq!(
            determine_semver_change(&[feat.clone(), feat]),
            ReleaseType::Minor
        );
        assert_eq!(
            determine_semver_change(&[fix, chore]),
            ReleaseType::Patch
        );
        assert_eq!(determine_semver_change(&[]), ReleaseType::Patch);
    }
}

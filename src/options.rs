//! Raw bump options and their normalized form.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{BumpError, Result};
use crate::operation::{OperationState, ProgressEvent};
use crate::release::Release;

/// Files bumped when none are given
pub const DEFAULT_FILES: &[&str] = &[
    "package.json",
    "package-lock.json",
    "jsr.json",
    "jsr.jsonc",
    "deno.json",
    "deno.jsonc",
];

/// Nested packages picked up in recursive mode, listed after the lockfile
pub const RECURSIVE_PACKAGES: &str = "packages/**/package.json";

pub const DEFAULT_COMMIT_MESSAGE: &str = "chore: release v";
pub const DEFAULT_TAG_NAME: &str = "v";

/// Directories never searched for manifests
const IGNORED_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "bower_components",
    "__tests__",
    "fixtures",
    "fixture",
];

/// A setting given as a plain on/off flag or as a value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Switch {
    Flag(bool),
    Value(String),
}

impl Switch {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Switch::Flag(false))
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Switch::Value(v) => Some(v),
            Switch::Flag(_) => None,
        }
    }
}

/// Suggests a version for the "from config" prompt choice
pub type CustomVersionFn = Arc<dyn Fn(&semver::Version) -> Option<String> + Send + Sync>;

/// Called after every state update that carries a [`ProgressEvent`]
pub type ProgressFn = Arc<dyn Fn(ProgressEvent, &OperationState) + Send + Sync>;

/// Options as given by the caller, before defaults and discovery
#[derive(Clone)]
pub struct BumpOptions {
    /// `prompt`, a release type, or an explicit version; `None` prompts
    pub release: Option<String>,
    pub current_version: Option<String>,
    pub preid: Option<String>,
    /// Commit, optionally with a message template
    pub commit: Switch,
    /// Tag, optionally with a tag name template
    pub tag: Switch,
    pub push: bool,
    pub sign: bool,
    /// Commit all changed files, not just the bumped ones
    pub all: bool,
    pub no_git_check: bool,
    pub no_verify: bool,
    pub confirm: bool,
    pub recursive: bool,
    pub install: bool,
    pub ignore_scripts: bool,
    pub print_commits: bool,
    pub execute: Option<String>,
    /// `true` asks for the tag, a value sets it
    pub publish_tag: Option<Switch>,
    pub files: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// Whether prompts may be shown
    pub interface: bool,
    pub custom_version: Option<CustomVersionFn>,
    pub progress: Option<ProgressFn>,
}

impl Default for BumpOptions {
    fn default() -> Self {
        BumpOptions {
            release: None,
            current_version: None,
            preid: None,
            commit: Switch::Flag(true),
            tag: Switch::Flag(true),
            push: true,
            sign: false,
            all: false,
            no_git_check: false,
            no_verify: false,
            confirm: true,
            recursive: false,
            install: false,
            ignore_scripts: false,
            print_commits: true,
            execute: None,
            publish_tag: None,
            files: Vec::new(),
            cwd: None,
            interface: true,
            custom_version: None,
            progress: None,
        }
    }
}

impl fmt::Debug for BumpOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BumpOptions")
            .field("release", &self.release)
            .field("current_version", &self.current_version)
            .field("commit", &self.commit)
            .field("tag", &self.tag)
            .field("push", &self.push)
            .field("files", &self.files)
            .field("cwd", &self.cwd)
            .field("interface", &self.interface)
            .field("custom_version", &self.custom_version.is_some())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOptions {
    pub message: String,
    pub no_verify: bool,
    pub all: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagOptions {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishTagRequest {
    Prompt,
    Tag(String),
}

/// Options after defaults are applied and file patterns are expanded
#[derive(Clone)]
pub struct NormalizedOptions {
    pub release: Release,
    pub commit: Option<CommitOptions>,
    pub tag: Option<TagOptions>,
    pub push: bool,
    pub sign: bool,
    pub no_git_check: bool,
    pub confirm: bool,
    pub install: bool,
    pub ignore_scripts: bool,
    pub print_commits: bool,
    pub execute: Option<String>,
    pub publish_tag: Option<PublishTagRequest>,
    /// Matched files, relative to `cwd`
    pub files: Vec<PathBuf>,
    pub cwd: PathBuf,
    pub interface: bool,
    pub current_version: Option<String>,
    pub custom_version: Option<CustomVersionFn>,
    pub progress: Option<ProgressFn>,
}

impl NormalizedOptions {
    /// Absolute location of a file from `files`
    pub fn resolve(&self, file: &Path) -> PathBuf {
        self.cwd.join(file)
    }
}

impl fmt::Debug for NormalizedOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalizedOptions")
            .field("release", &self.release)
            .field("commit", &self.commit)
            .field("tag", &self.tag)
            .field("push", &self.push)
            .field("files", &self.files)
            .field("cwd", &self.cwd)
            .field("interface", &self.interface)
            .field("publish_tag", &self.publish_tag)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct PnpmWorkspace {
    #[serde(default)]
    packages: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NpmWorkspaces {
    List(Vec<String>),
    Object {
        #[serde(default)]
        packages: Vec<String>,
    },
}

#[derive(Deserialize)]
struct PackageWorkspaces {
    workspaces: Option<NpmWorkspaces>,
}

/// Workspace package patterns from `pnpm-workspace.yaml` and `package.json#workspaces`
fn workspace_patterns(cwd: &Path) -> Result<Vec<String>> {
    let mut patterns = Vec::new();

    let pnpm = cwd.join("pnpm-workspace.yaml");
    if pnpm.is_file() {
        let workspace: PnpmWorkspace = serde_yaml::from_str(&fs::read_to_string(&pnpm)?)
            .map_err(|e| BumpError::manifest(pnpm.display().to_string(), e.to_string()))?;
        patterns.extend(workspace.packages);
    }

    let package = cwd.join("package.json");
    if package.is_file() {
        let manifest: PackageWorkspaces = serde_json::from_str(&fs::read_to_string(&package)?)
            .map_err(|e| BumpError::manifest(package.display().to_string(), e.to_string()))?;
        match manifest.workspaces {
            Some(NpmWorkspaces::List(list)) => patterns.extend(list),
            Some(NpmWorkspaces::Object { packages }) => patterns.extend(packages),
            None => {}
        }
    }

    Ok(patterns)
}

/// File patterns to expand: explicit files, or the defaults plus workspace packages
fn file_patterns(raw: &BumpOptions, cwd: &Path) -> Result<Vec<String>> {
    if !raw.files.is_empty() {
        return Ok(raw.files.clone());
    }

    let mut patterns: Vec<String> = DEFAULT_FILES.iter().map(|f| f.to_string()).collect();
    if raw.recursive {
        patterns.insert(2, RECURSIVE_PACKAGES.to_string());
        for workspace in workspace_patterns(cwd)? {
            let pattern = format!("{}/package.json", workspace.trim_end_matches('/'));
            if !pattern.starts_with('!') && !patterns.contains(&pattern) {
                patterns.push(pattern);
            }
        }
    }
    Ok(patterns)
}

fn is_ignored(relative: &Path) -> bool {
    relative.components().any(|c| match c {
        Component::Normal(name) => IGNORED_DIRS.iter().any(|d| name == *d),
        _ => false,
    })
}

/// Expand glob patterns under `cwd` into existing files, in pattern order.
pub fn expand_files(patterns: &[String], cwd: &Path) -> Result<Vec<PathBuf>> {
    let base = glob::Pattern::escape(&cwd.to_string_lossy());
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for pattern in patterns {
        let full = format!("{}/{}", base.trim_end_matches('/'), pattern.trim_start_matches("./"));
        let entries = glob::glob(&full).map_err(|e| {
            BumpError::invalid_argument(format!("Invalid file pattern '{}': {}", pattern, e))
        })?;

        for entry in entries {
            let path = entry.map_err(|e| BumpError::Io(e.into()))?;
            if !path.is_file() {
                continue;
            }
            let relative = path.strip_prefix(cwd).unwrap_or(&path).to_path_buf();
            if is_ignored(&relative) {
                continue;
            }
            if seen.insert(relative.clone()) {
                files.push(relative);
            }
        }
    }

    Ok(files)
}

/// Apply defaults, parse the release and expand file patterns.
///
/// Prompting with the interface disabled is rejected here, before any
/// file is touched.
pub fn normalize_options(raw: BumpOptions) -> Result<NormalizedOptions> {
    let release = Release::from_raw(raw.release.as_deref(), raw.preid.as_deref());
    if release.is_prompt() && !raw.interface {
        return Err(BumpError::InterfaceDisabled);
    }

    let tag = match &raw.tag {
        Switch::Value(name) => Some(TagOptions { name: name.clone() }),
        Switch::Flag(true) => Some(TagOptions {
            name: DEFAULT_TAG_NAME.to_string(),
        }),
        Switch::Flag(false) => None,
    };

    // A tag or push needs a release commit to point at
    let commit = match &raw.commit {
        Switch::Value(message) => Some(message.clone()),
        Switch::Flag(enabled) if *enabled || tag.is_some() || raw.push => {
            Some(DEFAULT_COMMIT_MESSAGE.to_string())
        }
        Switch::Flag(_) => None,
    }
    .map(|message| CommitOptions {
        message,
        no_verify: raw.no_verify,
        all: raw.all,
    });

    let cwd = match raw.cwd.clone() {
        Some(cwd) => cwd,
        None => std::env::current_dir()?,
    };

    let patterns = file_patterns(&raw, &cwd)?;
    let files = expand_files(&patterns, &cwd)?;
    tracing::debug!(?patterns, ?files, "expanded file patterns");

    let publish_tag = match raw.publish_tag {
        Some(Switch::Value(tag)) => Some(PublishTagRequest::Tag(tag)),
        Some(Switch::Flag(true)) => Some(PublishTagRequest::Prompt),
        Some(Switch::Flag(false)) | None => None,
    };

    Ok(NormalizedOptions {
        release,
        commit,
        tag,
        push: raw.push,
        sign: raw.sign,
        no_git_check: raw.no_git_check || raw.all,
        confirm: raw.confirm,
        install: raw.install,
        ignore_scripts: raw.ignore_scripts,
        print_commits: raw.print_commits,
        execute: raw.execute,
        publish_tag,
        files,
        cwd,
        interface: raw.interface,
        current_version: raw.current_version,
        custom_version: raw.custom_version,
        progress: raw.progress,
    })
}

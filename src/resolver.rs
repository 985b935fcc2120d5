//! Finding the current version and deciding the new one.

use console::style;
use semver::Version;
use std::path::PathBuf;

use crate::conventional::GitCommit;
use crate::error::{BumpError, Result};
use crate::manifest::{self, ManifestCache, ManifestKind, VersionSource};
use crate::operation::{Operation, StateUpdate, USER_SOURCE};
use crate::options::{NormalizedOptions, PublishTagRequest};
use crate::release::{Release, ReleaseType};
use crate::ui::{self, Prompter};
use crate::version;

/// Manifests checked for a version even when they are not bump targets
pub const FALLBACK_MANIFESTS: &[&str] = &["package.json", "deno.json", "deno.jsonc"];

/// Publish tag for stable versions
pub const LATEST_TAG: &str = "latest";

const LABEL_WIDTH: usize = 13;

/// Manifests to read the current version from, in priority order
///
/// Cargo manifests among the targets come first, then JSON manifests among
/// the targets, then the fallback manifests.
pub fn version_candidates(options: &NormalizedOptions) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let cargo = options
        .files
        .iter()
        .filter(|f| ManifestKind::detect(f) == ManifestKind::Cargo)
        .map(|f| options.resolve(f))
        .collect();

    let mut json: Vec<PathBuf> = options
        .files
        .iter()
        .filter(|f| ManifestKind::detect(f) == ManifestKind::Json)
        .map(|f| options.resolve(f))
        .collect();
    for fallback in FALLBACK_MANIFESTS {
        let path = options.cwd.join(fallback);
        if !json.contains(&path) {
            json.push(path);
        }
    }

    (cargo, json)
}

/// Locate the current version; `Ok(None)` when no manifest declares one
pub fn find_current_version(
    options: &NormalizedOptions,
    cache: &mut ManifestCache,
) -> Result<Option<VersionSource>> {
    let (cargo, json) = version_candidates(options);
    if let Some(found) = manifest::read_cargo_toml_version(cache, &cargo)? {
        return Ok(Some(found));
    }
    manifest::read_current_version(cache, &json)
}

/// Record the current version: the override from options, or the first
/// version found in the candidate manifests.
pub fn get_current_version(operation: Operation, cache: &mut ManifestCache) -> Result<Operation> {
    if let Some(version) = operation.options.current_version.clone() {
        let version = version::parse(&version)?.to_string();
        return operation.update(StateUpdate::CurrentVersion {
            version,
            source: USER_SOURCE.to_string(),
        });
    }

    match find_current_version(&operation.options, cache)? {
        Some(found) => {
            let source = found
                .path
                .strip_prefix(&operation.options.cwd)
                .unwrap_or(&found.path)
                .display()
                .to_string();
            let version = version::parse(&found.version)?.to_string();
            operation.update(StateUpdate::CurrentVersion { version, source })
        }
        None => {
            let (cargo, json) = version_candidates(&operation.options);
            let checked: Vec<String> = cargo
                .iter()
                .chain(json.iter())
                .map(|p| p.display().to_string())
                .collect();
            Err(BumpError::VersionNotFound(checked.join(", ")))
        }
    }
}

/// Decide the new version from the release request
pub fn get_new_version(
    operation: Operation,
    commits: &[GitCommit],
    prompter: &dyn Prompter,
) -> Result<Operation> {
    let current = version::parse(operation.state().current_version()?)?;

    match operation.options.release.clone() {
        Release::Version(raw) => {
            let version = version::parse(&raw)?.to_string();
            operation.update(StateUpdate::NewVersion {
                version,
                release: None,
            })
        }
        Release::Bump { kind, preid } => {
            let next = version::increment(&current, kind, &preid, commits)?;
            tracing::debug!(%current, %next, release = %kind, "bumped version");
            operation.update(StateUpdate::NewVersion {
                version: next.to_string(),
                release: Some(kind),
            })
        }
        Release::Prompt { preid } => {
            if !operation.options.interface {
                return Err(BumpError::InterfaceDisabled);
            }
            prompt_for_new_version(operation, &current, &preid, commits, prompter)
        }
    }
}

#[derive(Debug, Clone)]
enum Choice {
    Bump(ReleaseType),
    /// `next` and `conventional`: record the version but not the kind
    Computed(Version),
    Config(Version),
    AsIs,
    Custom,
}

fn label(name: &str, version: &str) -> String {
    format!(
        "{:>width$} {}",
        name,
        style(version).bold(),
        width = LABEL_WIDTH
    )
}

fn prompt_for_new_version(
    operation: Operation,
    current: &Version,
    preid: &str,
    commits: &[GitCommit],
    prompter: &dyn Prompter,
) -> Result<Operation> {
    let next = version::next_versions(current, preid, commits)?;
    let candidate = |kind: ReleaseType| {
        next.get(&kind)
            .cloned()
            .ok_or_else(|| BumpError::state(format!("no candidate for {}", kind)))
    };

    let from_config = match operation.options.custom_version.as_ref() {
        Some(hook) => match hook(current).map(|v| version::parse(&v)).transpose() {
            Ok(version) => version,
            Err(e) => {
                ui::display_warning(&format!("Ignoring version from config: {}", e));
                None
            }
        },
        None => None,
    };

    if operation.options.print_commits {
        ui::display_commits(commits);
    }

    let mut choices: Vec<(Choice, String)> = Vec::new();
    for kind in [ReleaseType::Major, ReleaseType::Minor, ReleaseType::Patch] {
        let version = candidate(kind)?;
        choices.push((Choice::Bump(kind), label(kind.as_str(), &version.to_string())));
    }
    for kind in [ReleaseType::Next, ReleaseType::Conventional] {
        let version = candidate(kind)?;
        let text = label(kind.as_str(), &version.to_string());
        choices.push((Choice::Computed(version), text));
    }
    if let Some(version) = &from_config {
        let text = label("from config", &version.to_string());
        choices.push((Choice::Config(version.clone()), text));
    }
    for (kind, name) in [
        (ReleaseType::PrePatch, "pre-patch"),
        (ReleaseType::PreMinor, "pre-minor"),
        (ReleaseType::PreMajor, "pre-major"),
    ] {
        let version = candidate(kind)?;
        choices.push((Choice::Bump(kind), label(name, &version.to_string())));
    }
    choices.push((Choice::AsIs, label("as-is", &current.to_string())));
    choices.push((
        Choice::Custom,
        format!("{:>width$}", "custom ...", width = LABEL_WIDTH + 4),
    ));

    let initial = choices
        .iter()
        .position(|(choice, _)| match choice {
            Choice::Config(_) => true,
            Choice::Computed(_) if from_config.is_none() => true,
            _ => false,
        })
        .unwrap_or(0);

    let items: Vec<String> = choices.iter().map(|(_, text)| text.clone()).collect();
    let prompt = format!("Current version {}", style(current).green());
    let selected = prompter
        .select(&prompt, &items, initial)?
        .ok_or(BumpError::Cancelled)?;
    let (choice, _) = choices
        .get(selected)
        .cloned()
        .ok_or_else(|| BumpError::invalid_argument(format!("no choice {}", selected)))?;

    let (version, release) = match choice {
        Choice::Bump(kind) => (candidate(kind)?, Some(kind)),
        Choice::Computed(version) | Choice::Config(version) => (version, None),
        Choice::AsIs => (current.clone(), None),
        Choice::Custom => (prompt_for_custom_version(current, prompter)?, None),
    };

    operation.update(StateUpdate::NewVersion {
        version: version.to_string(),
        release,
    })
}

fn prompt_for_custom_version(current: &Version, prompter: &dyn Prompter) -> Result<Version> {
    let initial = current.to_string();
    loop {
        let answer = prompter
            .input("Enter the new version number:", Some(&initial))?
            .filter(|answer| !answer.trim().is_empty())
            .ok_or(BumpError::Cancelled)?;

        match version::parse(&answer) {
            Ok(version) => return Ok(version),
            Err(_) => ui::display_warning("That's not a valid version number"),
        }
    }
}

/// Settle the npm publish tag, asking when requested
///
/// The prompt defaults to the new version's first prerelease identifier, or
/// `latest` for stable versions. An empty answer leaves the tag unset.
pub fn resolve_publish_tag(operation: Operation, prompter: &dyn Prompter) -> Result<Operation> {
    let tag = match operation.options.publish_tag.clone() {
        None => return Ok(operation),
        Some(PublishTagRequest::Tag(tag)) => Some(tag),
        Some(PublishTagRequest::Prompt) => {
            let new_version = version::parse(operation.state().new_version()?)?;
            let default_tag =
                version::prerelease_tag(&new_version).unwrap_or_else(|| LATEST_TAG.to_string());

            if operation.options.interface {
                prompter.input("Publish Tag", Some(&default_tag))?
            } else {
                Some(default_tag)
            }
        }
    };

    match tag.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) {
        Some(tag) => operation.update(StateUpdate::PublishTag(tag)),
        None => Ok(operation),
    }
}

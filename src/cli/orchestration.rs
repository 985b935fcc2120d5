//! Main workflow orchestration logic
//!
//! [`version_bump`] runs one release from raw options to a pushed tag. The
//! git repository and the prompter are passed in, so the same pipeline runs
//! against a real repository from `main` and against mocks in tests.

use crate::conventional::{parse_git_commit, GitCommit};
use crate::error::{BumpError, Result};
use crate::git::{format_version_string, tag_pattern, CommitRequest, Repository, TagRequest};
use crate::manifest::{self, ManifestCache};
use crate::operation::{Operation, StateUpdate};
use crate::options::{normalize_options, BumpOptions, NormalizedOptions, DEFAULT_TAG_NAME};
use crate::release::{Release, ReleaseType};
use crate::resolver::{get_current_version, get_new_version, resolve_publish_tag};
use crate::scripts::{ScriptContext, ScriptExecutor, POSTVERSION_SCRIPT, VERSION_SCRIPT};
use crate::ui::{self, Prompter};

/// Main version bump workflow
///
/// Orchestrates the entire release:
/// 1. Normalize options and check the working tree
/// 2. Determine the current version, then the new one
/// 3. Confirm and rewrite every target file
/// 4. Run the `execute` command, install and the `version` script
/// 5. Commit, tag, run `postversion`, push
///
/// # Arguments
///
/// * `raw` - Options as given on the command line or by a caller
/// * `repo` - Git repository the release is recorded in
/// * `prompter` - Answers interactive questions
///
/// # Returns
///
/// The finished operation, or the first error. Nothing is rolled back.
pub fn version_bump<R: Repository + ?Sized>(
    raw: BumpOptions,
    repo: &R,
    prompter: &dyn Prompter,
) -> Result<Operation> {
    let options = normalize_options(raw)?;
    tracing::debug!(?options, "normalized options");

    check_git_status(&options, repo)?;

    let mut cache = ManifestCache::new();
    let operation = get_current_version(Operation::start(options), &mut cache)?;

    let commits = if needs_commits(&operation.options) {
        load_commits(&operation.options, repo)?
    } else {
        Vec::new()
    };

    let operation = get_new_version(operation, &commits, prompter)?;
    let operation = resolve_publish_tag(operation, prompter)?;

    if operation.options.confirm && operation.options.interface {
        ui::display_summary(&operation.options, operation.state());
        if !prompter.confirm("Bump?", true)? {
            return Err(BumpError::Cancelled);
        }
    }

    let operation = update_files(operation, &mut cache)?;
    let operation = run_scripts(operation)?;
    let operation = git_commit(operation, repo)?;
    let operation = git_tag(operation, repo)?;
    let operation = run_npm_script(operation, POSTVERSION_SCRIPT)?;
    git_push(operation, repo)
}

/// Refuse to release from a dirty working tree when committing or tagging
pub fn check_git_status<R: Repository + ?Sized>(
    options: &NormalizedOptions,
    repo: &R,
) -> Result<()> {
    if options.no_git_check || (options.commit.is_none() && options.tag.is_none()) {
        return Ok(());
    }

    let dirty = repo.dirty_files()?;
    if dirty.is_empty() {
        Ok(())
    } else {
        Err(BumpError::DirtyWorkingTree(dirty.join("\n")))
    }
}

fn needs_commits(options: &NormalizedOptions) -> bool {
    match &options.release {
        Release::Prompt { .. } => true,
        Release::Bump { kind, .. } => *kind == ReleaseType::Conventional,
        Release::Version(_) => false,
    }
}

/// Conventional commits since the last release tag, newest first
pub fn load_commits<R: Repository + ?Sized>(
    options: &NormalizedOptions,
    repo: &R,
) -> Result<Vec<GitCommit>> {
    let template = options
        .tag
        .as_ref()
        .map(|t| t.name.as_str())
        .unwrap_or(DEFAULT_TAG_NAME);

    let last_tag = repo.last_tag(&tag_pattern(template))?;
    let raw = repo.commits_since(last_tag.as_deref())?;
    let commits: Vec<GitCommit> = raw.iter().filter_map(parse_git_commit).collect();

    tracing::debug!(
        last_tag = last_tag.as_deref().unwrap_or("<none>"),
        raw = raw.len(),
        conventional = commits.len(),
        "loaded commits"
    );
    Ok(commits)
}

/// Write the new version into every target file
pub fn update_files(mut operation: Operation, cache: &mut ManifestCache) -> Result<Operation> {
    let current = operation.state().current_version()?.to_string();
    let new = operation.state().new_version()?.to_string();
    let publish_tag = operation.state().publish_tag.clone();

    for file in operation.options.files.clone() {
        let path = operation.options.resolve(&file);
        let changed = manifest::update_file(cache, &path, &current, &new, publish_tag.as_deref())?;
        operation = if changed {
            operation.update(StateUpdate::FileUpdated(file))?
        } else {
            operation.update(StateUpdate::FileSkipped(file))?
        };
    }

    Ok(operation)
}

fn run_scripts(operation: Operation) -> Result<Operation> {
    let context = ScriptContext::from_state(operation.state());

    if let Some(command) = &operation.options.execute {
        ui::display_status(&format!("Running {}", command));
        ScriptExecutor::execute(command, &operation.options.cwd, &context)?;
        ui::display_success(&format!("Executed {}", command));
    }

    if operation.options.install {
        ui::display_status("Installing dependencies");
        let manager = ScriptExecutor::install(&operation.options.cwd, &context)?;
        ui::display_success(&format!("Installed dependencies with {}", manager));
    }

    run_npm_script(operation, VERSION_SCRIPT)
}

fn run_npm_script(operation: Operation, script: &str) -> Result<Operation> {
    if operation.options.ignore_scripts {
        return Ok(operation);
    }

    let context = ScriptContext::from_state(operation.state());
    if ScriptExecutor::run_npm_script(script, &operation.options.cwd, &context)? {
        operation.update(StateUpdate::ScriptRun {
            script: script.to_string(),
        })
    } else {
        Ok(operation)
    }
}

fn git_commit<R: Repository + ?Sized>(operation: Operation, repo: &R) -> Result<Operation> {
    let Some(commit) = operation.options.commit.clone() else {
        return Ok(operation);
    };

    let message = format_version_string(&commit.message, operation.state().new_version()?);
    repo.commit(&CommitRequest {
        message: message.clone(),
        files: operation.state().updated_files.clone(),
        all: commit.all,
        no_verify: commit.no_verify,
        sign: operation.options.sign,
    })?;

    operation.update(StateUpdate::Committed { message })
}

fn git_tag<R: Repository + ?Sized>(operation: Operation, repo: &R) -> Result<Operation> {
    let Some(tag) = operation.options.tag.clone() else {
        return Ok(operation);
    };

    let name = format_version_string(&tag.name, operation.state().new_version()?);
    let message = operation
        .state()
        .commit_message
        .clone()
        .unwrap_or_else(|| name.clone());

    repo.tag(&TagRequest {
        name: name.clone(),
        message,
        sign: operation.options.sign,
    })?;

    operation.update(StateUpdate::Tagged { name })
}

fn git_push<R: Repository + ?Sized>(operation: Operation, repo: &R) -> Result<Operation> {
    if !operation.options.push {
        return Ok(operation);
    }

    repo.push(operation.options.tag.is_some())?;
    operation.update(StateUpdate::Pushed)
}

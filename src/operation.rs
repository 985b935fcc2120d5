//! The state threaded through one bump.
//!
//! Options are frozen when the [`Operation`] is created; results accumulate
//! in [`OperationState`] through [`OperationState::apply`], the only way the
//! state changes.

use std::fmt;
use std::path::PathBuf;

use crate::error::{BumpError, Result};
use crate::options::NormalizedOptions;
use crate::release::ReleaseType;
use crate::version;

/// Source label used when the current version comes from options
pub const USER_SOURCE: &str = "user";

/// Lifecycle events reported to the progress hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    FileUpdated,
    FileSkipped,
    GitCommit,
    GitTag,
    GitPush,
    NpmScript,
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProgressEvent::FileUpdated => "file updated",
            ProgressEvent::FileSkipped => "file skipped",
            ProgressEvent::GitCommit => "git commit",
            ProgressEvent::GitTag => "git tag",
            ProgressEvent::GitPush => "git push",
            ProgressEvent::NpmScript => "npm script",
        };
        f.write_str(name)
    }
}

/// Results accumulated while the operation runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationState {
    pub release: Option<ReleaseType>,
    /// Path (or `"user"`) the current version was read from
    pub current_version_source: Option<String>,
    pub current_version: Option<String>,
    pub new_version: Option<String>,
    pub commit_message: Option<String>,
    pub tag_name: Option<String>,
    pub publish_tag: Option<String>,
    pub script: Option<String>,
    pub updated_files: Vec<PathBuf>,
    pub skipped_files: Vec<PathBuf>,
    pub event: Option<ProgressEvent>,
}

/// One state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateUpdate {
    CurrentVersion { version: String, source: String },
    /// `release` is set when a named release kind produced the version
    NewVersion {
        version: String,
        release: Option<ReleaseType>,
    },
    PublishTag(String),
    FileUpdated(PathBuf),
    FileSkipped(PathBuf),
    Committed { message: String },
    Tagged { name: String },
    Pushed,
    ScriptRun { script: String },
}

impl OperationState {
    /// Apply one update, returning the state that replaces this one.
    ///
    /// Fails if a new version arrives before the current version is known,
    /// or if the current version would change after the new one was chosen.
    pub fn apply(mut self, update: StateUpdate) -> Result<Self> {
        match update {
            StateUpdate::CurrentVersion { version, source } => {
                if self.new_version.is_some() {
                    return Err(BumpError::state(
                        "current version cannot change once the new version is set",
                    ));
                }
                version::parse(&version)?;
                self.current_version = Some(version);
                self.current_version_source = Some(source);
            }
            StateUpdate::NewVersion { version, release } => {
                if self.current_version.is_none() {
                    return Err(BumpError::state(
                        "new version set before the current version is known",
                    ));
                }
                version::parse(&version)?;
                self.new_version = Some(version);
                if release.is_some() {
                    self.release = release;
                }
            }
            StateUpdate::PublishTag(tag) => self.publish_tag = Some(tag),
            StateUpdate::FileUpdated(path) => {
                if !self.updated_files.contains(&path) {
                    self.updated_files.push(path);
                }
                self.event = Some(ProgressEvent::FileUpdated);
            }
            StateUpdate::FileSkipped(path) => {
                if !self.skipped_files.contains(&path) {
                    self.skipped_files.push(path);
                }
                self.event = Some(ProgressEvent::FileSkipped);
            }
            StateUpdate::Committed { message } => {
                self.commit_message = Some(message);
                self.event = Some(ProgressEvent::GitCommit);
            }
            StateUpdate::Tagged { name } => {
                self.tag_name = Some(name);
                self.event = Some(ProgressEvent::GitTag);
            }
            StateUpdate::Pushed => self.event = Some(ProgressEvent::GitPush),
            StateUpdate::ScriptRun { script } => {
                self.script = Some(script);
                self.event = Some(ProgressEvent::NpmScript);
            }
        }
        Ok(self)
    }

    pub fn current_version(&self) -> Result<&str> {
        self.current_version
            .as_deref()
            .ok_or_else(|| BumpError::state("current version is not known yet"))
    }

    pub fn new_version(&self) -> Result<&str> {
        self.new_version
            .as_deref()
            .ok_or_else(|| BumpError::state("new version is not set yet"))
    }
}

/// Options plus accumulated state for one bump
pub struct Operation {
    pub options: NormalizedOptions,
    state: OperationState,
}

impl Operation {
    pub fn start(options: NormalizedOptions) -> Self {
        Operation {
            options,
            state: OperationState::default(),
        }
    }

    pub fn state(&self) -> &OperationState {
        &self.state
    }

    /// Advance the state and report any event to the progress hook
    pub fn update(mut self, update: StateUpdate) -> Result<Self> {
        let had_event = matches!(
            update,
            StateUpdate::FileUpdated(_)
                | StateUpdate::FileSkipped(_)
                | StateUpdate::Committed { .. }
                | StateUpdate::Tagged { .. }
                | StateUpdate::Pushed
                | StateUpdate::ScriptRun { .. }
        );

        self.state = self.state.apply(update)?;

        if let (true, Some(event), Some(progress)) =
            (had_event, self.state.event, self.options.progress.as_ref())
        {
            progress(event, &self.state);
        }
        Ok(self)
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("options", &self.options)
            .field("state", &self.state)
            .finish()
    }
}

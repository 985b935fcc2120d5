//! Commands run around the version bump
//!
//! - `execute`: a user command run after the files are updated
//! - install: the project's package manager, when `install` is set
//! - npm lifecycle: the `version` script before committing and
//!   `postversion` after tagging, unless scripts are ignored

pub mod context;
pub mod executor;

pub use context::{PackageManager, ScriptContext};
pub use executor::ScriptExecutor;

/// Lifecycle script run after files are updated, before the commit
pub const VERSION_SCRIPT: &str = "version";

/// Lifecycle script run after the tag is created
pub const POSTVERSION_SCRIPT: &str = "postversion";

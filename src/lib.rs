//! Bump the version of npm, JSR, Deno and Cargo manifests, then record the
//! release in git.
//!
//! The library exposes each stage on its own: [`version`] for SemVer
//! arithmetic, [`conventional`] for commit classification, [`manifest`] for
//! reading and rewriting manifests, and [`cli::version_bump`] for the whole
//! pipeline.

pub mod cli;
pub mod config;
pub mod conventional;
pub mod error;
pub mod git;
pub mod manifest;
pub mod operation;
pub mod options;
pub mod release;
pub mod resolver;
pub mod scripts;
pub mod ui;
pub mod version;

pub use error::{BumpError, Result};
pub use operation::{Operation, OperationState};
pub use options::BumpOptions;
pub use release::{Release, ReleaseType};

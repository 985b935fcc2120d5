//! Release kinds and the release request union.

use std::fmt;
use std::str::FromStr;

use crate::error::BumpError;

/// Default prerelease identifier
pub const DEFAULT_PREID: &str = "beta";

/// A relative version bump
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseType {
    Major,
    Minor,
    Patch,
    PreMajor,
    PreMinor,
    PrePatch,
    PreRelease,
    /// Prerelease increment for prerelease versions, patch otherwise
    Next,
    /// Prerelease increment for prerelease versions, commit-derived otherwise
    Conventional,
}

impl ReleaseType {
    /// Every kind, in presentation order
    pub const ALL: [ReleaseType; 9] = [
        ReleaseType::Major,
        ReleaseType::Minor,
        ReleaseType::Patch,
        ReleaseType::PreMajor,
        ReleaseType::PreMinor,
        ReleaseType::PrePatch,
        ReleaseType::PreRelease,
        ReleaseType::Next,
        ReleaseType::Conventional,
    ];

    /// Whether this kind produces a prerelease version
    pub fn is_prerelease(self) -> bool {
        matches!(
            self,
            ReleaseType::PreMajor
                | ReleaseType::PreMinor
                | ReleaseType::PrePatch
                | ReleaseType::PreRelease
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReleaseType::Major => "major",
            ReleaseType::Minor => "minor",
            ReleaseType::Patch => "patch",
            ReleaseType::PreMajor => "premajor",
            ReleaseType::PreMinor => "preminor",
            ReleaseType::PrePatch => "prepatch",
            ReleaseType::PreRelease => "prerelease",
            ReleaseType::Next => "next",
            ReleaseType::Conventional => "conventional",
        }
    }
}

impl FromStr for ReleaseType {
    type Err = BumpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReleaseType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.to_lowercase())
            .ok_or_else(|| BumpError::invalid_argument(format!("Unknown release type: '{}'", s)))
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What version change was requested
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Release {
    /// An explicit target version
    Version(String),
    /// Ask the user interactively
    Prompt { preid: String },
    /// A relative bump
    Bump { kind: ReleaseType, preid: String },
}

impl Release {
    /// Build a release request from its raw text form.
    ///
    /// `None` and `"prompt"` ask interactively, release kinds bump, and
    /// anything else is taken as an explicit version.
    pub fn from_raw(raw: Option<&str>, preid: Option<&str>) -> Self {
        let preid = preid
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_PREID)
            .to_string();

        match raw {
            None | Some("prompt") => Release::Prompt { preid },
            Some(raw) => match raw.parse::<ReleaseType>() {
                Ok(kind) => Release::Bump { kind, preid },
                Err(_) => Release::Version(raw.to_string()),
            },
        }
    }

    pub fn is_prompt(&self) -> bool {
        matches!(self, Release::Prompt { .. })
    }
}

//! Semantic version parsing and increment rules.
//!
//! Parsing is delegated to the `semver` crate. Increments follow the npm
//! `semver.inc` rules, so a prerelease of the same line is "finished" by a
//! stable bump (`1.0.0-beta.2` + `major` = `1.0.0`) and prerelease counters
//! are bumped in place.

use std::collections::HashMap;
use std::fmt;

use semver::{BuildMetadata, Prerelease, Version};

use crate::conventional::{determine_semver_change, GitCommit};
use crate::error::{BumpError, Result};
use crate::release::ReleaseType;

/// One dot-separated prerelease identifier
#[derive(Debug, Clone, PartialEq, Eq)]
enum Identifier {
    Numeric(u64),
    Text(String),
}

impl Identifier {
    fn parse(s: &str) -> Self {
        match s.parse::<u64>() {
            Ok(n) if s.chars().all(|c| c.is_ascii_digit()) => Identifier::Numeric(n),
            _ => Identifier::Text(s.to_string()),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Numeric(n) => write!(f, "{}", n),
            Identifier::Text(s) => f.write_str(s),
        }
    }
}

fn identifiers(pre: &Prerelease) -> Vec<Identifier> {
    if pre.is_empty() {
        Vec::new()
    } else {
        pre.as_str().split('.').map(Identifier::parse).collect()
    }
}

fn to_prerelease(ids: &[Identifier]) -> Result<Prerelease> {
    let joined = ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(".");
    Prerelease::new(&joined)
        .map_err(|e| BumpError::invalid_version(format!("prerelease '{}': {}", joined, e)))
}

/// Parse a version string, tolerating surrounding whitespace and a leading `v` or `=`.
pub fn parse(version: &str) -> Result<Version> {
    let trimmed = version.trim();
    let cleaned = trimmed
        .strip_prefix('=')
        .unwrap_or(trimmed)
        .trim_start_matches(['v', 'V']);

    Version::parse(cleaned).map_err(|e| BumpError::invalid_version(format!("'{}': {}", version, e)))
}

/// Whether the string is a valid semantic version
pub fn is_valid(version: &str) -> bool {
    parse(version).is_ok()
}

fn bump(component: u64, name: &str) -> Result<u64> {
    component.checked_add(1).ok_or_else(|| {
        BumpError::invalid_version(format!("{} version {} cannot be incremented", name, component))
    })
}

/// Apply the node-semver "pre" step: bump the last numeric identifier, then
/// switch to `preid` unless already on that identifier line.
fn increment_pre(version: &mut Version, preid: &str) -> Result<()> {
    let mut ids = identifiers(&version.pre);

    let last_numeric = ids
        .iter()
        .rposition(|id| matches!(id, Identifier::Numeric(_)));
    match last_numeric.map(|i| &mut ids[i]) {
        Some(Identifier::Numeric(n)) => *n = bump(*n, "prerelease")?,
        _ => ids.push(Identifier::Numeric(0)),
    }

    if !preid.is_empty() {
        let restart = vec![Identifier::Text(preid.to_string()), Identifier::Numeric(0)];
        match ids.first() {
            Some(Identifier::Text(first)) if first == preid => {
                if !matches!(ids.get(1), Some(Identifier::Numeric(_))) {
                    ids = restart;
                }
            }
            _ => ids = restart,
        }
    }

    version.pre = to_prerelease(&ids)?;
    Ok(())
}

/// Increment a concrete (non meta) release kind
fn increment_concrete(current: &Version, kind: ReleaseType, preid: &str) -> Result<Version> {
    let mut next = current.clone();
    next.build = BuildMetadata::EMPTY;
    let stable = current.pre.is_empty();

    match kind {
        ReleaseType::Major => {
            if next.minor != 0 || next.patch != 0 || stable {
                next.major = bump(next.major, "major")?;
            }
            next.minor = 0;
            next.patch = 0;
            next.pre = Prerelease::EMPTY;
        }
        ReleaseType::Minor => {
            if next.patch != 0 || stable {
                next.minor = bump(next.minor, "minor")?;
            }
            next.patch = 0;
            next.pre = Prerelease::EMPTY;
        }
        ReleaseType::Patch => {
            if stable {
                next.patch = bump(next.patch, "patch")?;
            }
            next.pre = Prerelease::EMPTY;
        }
        ReleaseType::PreMajor => {
            next.pre = Prerelease::EMPTY;
            next.major = bump(next.major, "major")?;
            next.minor = 0;
            next.patch = 0;
            increment_pre(&mut next, preid)?;
        }
        ReleaseType::PreMinor => {
            next.pre = Prerelease::EMPTY;
            next.minor = bump(next.minor, "minor")?;
            next.patch = 0;
            increment_pre(&mut next, preid)?;
        }
        ReleaseType::PrePatch => {
            next.pre = Prerelease::EMPTY;
            next.patch = bump(next.patch, "patch")?;
            increment_pre(&mut next, preid)?;
        }
        ReleaseType::PreRelease => {
            if stable {
                next.patch = bump(next.patch, "patch")?;
            }
            increment_pre(&mut next, preid)?;
        }
        ReleaseType::Next | ReleaseType::Conventional => {
            return Err(BumpError::state(format!(
                "'{}' must be resolved to a concrete release kind",
                kind
            )));
        }
    }

    Ok(next)
}

/// Resolve `next`/`conventional` to the concrete kind they stand for.
pub fn resolve_kind(current: &Version, kind: ReleaseType, commits: &[GitCommit]) -> ReleaseType {
    match kind {
        ReleaseType::Next if !current.pre.is_empty() => ReleaseType::PreRelease,
        ReleaseType::Next => ReleaseType::Patch,
        ReleaseType::Conventional if !current.pre.is_empty() => ReleaseType::PreRelease,
        ReleaseType::Conventional => determine_semver_change(commits),
        other => other,
    }
}

/// Compute the next version for `kind`.
///
/// `commits` is only consulted for [`ReleaseType::Conventional`].
pub fn increment(
    current: &Version,
    kind: ReleaseType,
    preid: &str,
    commits: &[GitCommit],
) -> Result<Version> {
    let concrete = resolve_kind(current, kind, commits);
    let mut next = increment_concrete(current, concrete, preid)?;

    // Going from stable to the first prerelease of a line reads better as `.1`
    if kind.is_prerelease() {
        let ids = identifiers(&next.pre);
        if ids.len() == 2
            && ids[0] == Identifier::Text(preid.to_string())
            && ids[1] == Identifier::Numeric(0)
        {
            next.pre = to_prerelease(&[ids[0].clone(), Identifier::Numeric(1)])?;
        }
    }

    Ok(next)
}

/// Compute every candidate next version, keyed by release kind.
///
/// A textual first prerelease identifier on `current` takes precedence over
/// `preid`, so `1.0.0-alpha.3` keeps proposing `alpha` versions.
pub fn next_versions(
    current: &Version,
    preid: &str,
    commits: &[GitCommit],
) -> Result<HashMap<ReleaseType, Version>> {
    let preid = match identifiers(&current.pre).first() {
        Some(Identifier::Text(existing)) => existing.clone(),
        _ => preid.to_string(),
    };

    ReleaseType::ALL
        .into_iter()
        .map(|kind| Ok((kind, increment(current, kind, &preid, commits)?)))
        .collect()
}

/// First prerelease identifier of a version, if any (`1.0.0-rc.1` gives `rc`)
pub fn prerelease_tag(version: &Version) -> Option<String> {
    identifiers(&version.pre)
        .into_iter()
        .next()
        .map(|id| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inc(v: &str, kind: ReleaseType, preid: &str) -> String {
        increment(&parse(v).unwrap(), kind, preid, &[])
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_parse_tolerates_prefixes() {
        assert_eq!(parse("v1.2.3").unwrap(), Version::new(1, 2, 3));
        assert_eq!(parse("  =1.2.3 ").unwrap(), Version::new(1, 2, 3));
        assert!(parse("1.2").is_err());
        assert!(parse("not-a-version").is_err());
        assert!(is_valid("1.0.0-beta.1+build.5"));
        assert!(!is_valid(""));
    }

    #[test]
    fn test_stable_bumps() {
        assert_eq!(inc("1.2.3", ReleaseType::Major, "beta"), "2.0.0");
        assert_eq!(inc("1.2.3", ReleaseType::Minor, "beta"), "1.3.0");
        assert_eq!(inc("1.2.3", ReleaseType::Patch, "beta"), "1.2.4");
        assert_eq!(inc("1.2.3+build.1", ReleaseType::Patch, "beta"), "1.2.4");
    }

    #[test]
    fn test_increment_is_strictly_greater() {
        let versions = [
            "0.0.0",
            "1.2.3",
            "1.0.0+sha.abc",
            "1.2.3-beta.4",
            "2.0.0-beta.1+build.5",
            "0.1.0-beta",
        ];
        let kinds = [
            ReleaseType::Major,
            ReleaseType::Minor,
            ReleaseType::Patch,
            ReleaseType::PreMajor,
            ReleaseType::PreMinor,
            ReleaseType::PrePatch,
            ReleaseType::PreRelease,
            ReleaseType::Next,
        ];

        for v in versions {
            let current = parse(v).unwrap();
            for kind in kinds {
                let next = increment(&current, kind, "beta", &[]).unwrap();
                assert!(next > current, "{} {} gave {}", v, kind, next);
                assert!(next.build.is_empty(), "{} {} kept build metadata", v, kind);

                match kind {
                    ReleaseType::Major => assert_eq!((next.minor, next.patch), (0, 0)),
                    ReleaseType::Minor => assert_eq!(next.patch, 0),
                    _ => {}
                }
                if !kind.is_prerelease() && kind != ReleaseType::Next {
                    assert!(next.pre.is_empty(), "{} {} gave {}", v, kind, next);
                }
            }
        }
    }

    #[test]
    fn test_overflowing_component_is_rejected() {
        let max = parse("18446744073709551615.0.0").unwrap();
        let err = increment(&max, ReleaseType::Major, "beta", &[]).unwrap_err();
        assert!(matches!(err, BumpError::InvalidVersion(_)));

        let minor = parse("1.18446744073709551615.0").unwrap();
        assert!(increment(&minor, ReleaseType::PreMinor, "beta", &[]).is_err());

        let pre = parse("1.0.0-beta.18446744073709551615").unwrap();
        assert!(increment(&pre, ReleaseType::PreRelease, "beta", &[]).is_err());
    }

    #[test]
    fn test_stable_bump_finishes_prerelease() {
        assert_eq!(inc("2.0.0-beta.3", ReleaseType::Major, "beta"), "2.0.0");
        assert_eq!(inc("1.3.0-beta.3", ReleaseType::Minor, "beta"), "1.3.0");
        assert_eq!(inc("1.2.4-beta.3", ReleaseType::Patch, "beta"), "1.2.4");
        assert_eq!(inc("1.2.4-beta.3", ReleaseType::Major, "beta"), "2.0.0");
    }

    #[test]
    fn test_prerelease_from_stable_starts_at_one() {
        assert_eq!(inc("1.2.3", ReleaseType::PreMajor, "beta"), "2.0.0-beta.1");
        assert_eq!(inc("1.2.3", ReleaseType::PreMinor, "beta"), "1.3.0-beta.1");
        assert_eq!(inc("1.2.3", ReleaseType::PrePatch, "beta"), "1.2.4-beta.1");
        assert_eq!(inc("1.2.3", ReleaseType::PreRelease, "alpha"), "1.2.4-alpha.1");
    }

    #[test]
    fn test_prerelease_counters() {
        assert_eq!(inc("1.2.4-beta.1", ReleaseType::PreRelease, "beta"), "1.2.4-beta.2");
        assert_eq!(inc("1.2.4-beta.1", ReleaseType::PreRelease, "rc"), "1.2.4-rc.1");
        assert_eq!(inc("1.2.4-beta", ReleaseType::PreRelease, "beta"), "1.2.4-beta.1");
        assert_eq!(inc("1.2.4-0", ReleaseType::PreRelease, ""), "1.2.4-1");
        assert_eq!(
            inc("1.2.4-beta.1", ReleaseType::PreMajor, "beta"),
            "2.0.0-beta.1"
        );
    }

    #[test]
    fn test_next_follows_prerelease_state() {
        assert_eq!(inc("1.2.3", ReleaseType::Next, "beta"), "1.2.4");
        assert_eq!(inc("1.2.4-beta.1", ReleaseType::Next, "beta"), "1.2.4-beta.2");
    }

    #[test]
    fn test_conventional_without_commits_is_patch() {
        assert_eq!(inc("1.2.3", ReleaseType::Conventional, "beta"), "1.2.4");
        assert_eq!(
            inc("1.2.4-beta.1", ReleaseType::Conventional, "beta"),
            "1.2.4-beta.2"
        );
    }

    #[test]
    fn test_next_versions_prefers_existing_preid() {
        let current = parse("1.0.0-alpha.3").unwrap();
        let next = next_versions(&current, "beta", &[]).unwrap();
        assert_eq!(next[&ReleaseType::PreRelease].to_string(), "1.0.0-alpha.4");
        assert_eq!(next[&ReleaseType::PrePatch].to_string(), "1.0.1-alpha.1");
        assert_eq!(next[&ReleaseType::Major].to_string(), "1.0.0");
        assert_eq!(next.len(), ReleaseType::ALL.len());
    }

    #[test]
    fn test_invalid_preid_is_rejected() {
        let current = parse("1.0.0").unwrap();
        assert!(increment(&current, ReleaseType::PreRelease, "not valid", &[]).is_err());
    }

    #[test]
    fn test_prerelease_tag() {
        assert_eq!(prerelease_tag(&parse("1.0.0-rc.1").unwrap()), Some("rc".into()));
        assert_eq!(prerelease_tag(&parse("1.0.0-1").unwrap()), Some("1".into()));
        assert_eq!(prerelease_tag(&parse("1.0.0").unwrap()), None);
    }
}

//! Manifest readers and mutators
//!
//! Files are handled by name:
//!
//! - npm-style JSON: `package.json`, `package-lock.json`, `jsr.json(c)`, `deno.json(c)`, ...
//! - `Cargo.toml`
//! - anything else is treated as plain text containing the version

pub mod cache;
pub mod cargo;
pub mod json;
pub mod text;

pub use cache::ManifestCache;
pub use cargo::DependencyEntry;

use std::path::{Path, PathBuf};

use crate::error::Result;

const JSON_MANIFESTS: &[&str] = &[
    "package.json",
    "package-lock.json",
    "bower.json",
    "component.json",
    "jsr.json",
    "jsr.jsonc",
    "deno.json",
    "deno.jsonc",
];

/// Manifests whose `publishConfig.tag` follows the publish tag
const PUBLISH_TAG_MANIFESTS: &[&str] = &["package.json"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
    Json,
    Cargo,
    Text,
}

impl ManifestKind {
    pub fn detect(path: &Path) -> Self {
        let name = file_name(path);
        if JSON_MANIFESTS.contains(&name.as_str()) {
            ManifestKind::Json
        } else if name.eq_ignore_ascii_case("cargo.toml") {
            ManifestKind::Cargo
        } else {
            ManifestKind::Text
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Where the current version was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionSource {
    pub path: PathBuf,
    pub version: String,
}

/// Read the declared version of one manifest. Missing files and plain
/// text files yield `None`.
pub fn read_version(cache: &mut ManifestCache, path: &Path) -> Result<Option<String>> {
    let kind = ManifestKind::detect(path);
    if kind == ManifestKind::Text || !path.is_file() {
        return Ok(None);
    }

    let content = cache.read(path)?;
    let version = match kind {
        ManifestKind::Json => json::read_version(content, path)?,
        ManifestKind::Cargo => cargo::read_version(content, path)?,
        ManifestKind::Text => None,
    };

    Ok(version.filter(|v| crate::version::is_valid(v)))
}

/// First version found across `paths`, checked in order
pub fn read_current_version(
    cache: &mut ManifestCache,
    paths: &[PathBuf],
) -> Result<Option<VersionSource>> {
    for path in paths {
        if let Some(version) = read_version(cache, path)? {
            tracing::debug!(path = %path.display(), %version, "found current version");
            return Ok(Some(VersionSource {
                path: path.clone(),
                version,
            }));
        }
    }
    Ok(None)
}

/// First version declared by the `Cargo.toml` files among `paths`
pub fn read_cargo_toml_version(
    cache: &mut ManifestCache,
    paths: &[PathBuf],
) -> Result<Option<VersionSource>> {
    let cargo: Vec<PathBuf> = paths
        .iter()
        .filter(|p| ManifestKind::detect(p) == ManifestKind::Cargo)
        .cloned()
        .collect();
    read_current_version(cache, &cargo)
}

/// Write `new_version` into one file. Returns whether the file changed.
///
/// `current_version` is what plain text files are searched for; the publish
/// tag only applies to `package.json`.
pub fn update_file(
    cache: &mut ManifestCache,
    path: &Path,
    current_version: &str,
    new_version: &str,
    publish_tag: Option<&str>,
) -> Result<bool> {
    if !path.is_file() {
        tracing::debug!(path = %path.display(), "file does not exist, skipping");
        return Ok(false);
    }

    let content = cache.read(path)?;
    let updated = match ManifestKind::detect(path) {
        ManifestKind::Json => {
            let name = file_name(path);
            let tag = publish_tag.filter(|_| PUBLISH_TAG_MANIFESTS.contains(&name.as_str()));
            json::update_version(content, path, new_version, tag)?
        }
        ManifestKind::Cargo => cargo::update_version(content, path, new_version)?,
        ManifestKind::Text => text::replace_version(content, current_version, new_version),
    };

    match updated {
        Some(updated) => {
            cache.write(path, updated)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

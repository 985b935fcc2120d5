//! `Cargo.toml` version discovery and rewriting.
//!
//! Edits go through `toml_edit` so comments, ordering and whitespace survive;
//! only the version string tokens are replaced.

use std::path::Path;

use toml_edit::{DocumentMut, Item, TableLike, Value};

use crate::error::{BumpError, Result};
use crate::version;

/// How a dependency table entry refers to its crate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyEntry {
    /// Registry or git dependency, optionally with a version requirement
    External(Option<String>),
    /// Sibling crate in the same repository, versioned alongside it
    Internal { version: String, path: String },
    /// Sibling crate without a version field
    PathOnly { path: String },
}

impl DependencyEntry {
    pub fn from_item(item: &Item) -> Self {
        if let Some(spec) = item.as_str() {
            return DependencyEntry::External(Some(spec.to_string()));
        }

        let Some(table) = item.as_table_like() else {
            return DependencyEntry::External(None);
        };
        let field = |key: &str| table.get(key).and_then(Item::as_str).map(str::to_string);

        match (field("path"), field("version")) {
            (Some(path), Some(version)) => DependencyEntry::Internal { version, path },
            (Some(path), None) => DependencyEntry::PathOnly { path },
            (None, version) => DependencyEntry::External(version),
        }
    }

    /// The version this entry pins when it tracks releases of this repository
    pub fn internal_version(&self) -> Option<&str> {
        match self {
            DependencyEntry::Internal { version: v, .. } if version::is_valid(v) => Some(v),
            _ => None,
        }
    }
}

fn parse_document(content: &str, path: &Path) -> Result<DocumentMut> {
    content
        .parse::<DocumentMut>()
        .map_err(|e| BumpError::manifest(path.display().to_string(), e.to_string()))
}

fn valid_str(item: Option<&Item>) -> Option<String> {
    item.and_then(Item::as_str)
        .filter(|v| version::is_valid(v))
        .map(str::to_string)
}

fn first_internal_version(dependencies: Option<&Item>) -> Option<String> {
    dependencies
        .and_then(Item::as_table_like)?
        .iter()
        .find_map(|(_, item)| {
            DependencyEntry::from_item(item)
                .internal_version()
                .map(str::to_string)
        })
}

/// Find the version a `Cargo.toml` declares.
///
/// Checked in order: `package.version`, `workspace.package.version`, the
/// first internal entry of `dependencies`, then of `workspace.dependencies`.
pub fn read_version(content: &str, path: &Path) -> Result<Option<String>> {
    let doc = parse_document(content, path)?;
    let workspace = doc.get("workspace");

    let workspace_package = workspace.and_then(|w| w.get("package"));

    let found = valid_str(doc.get("package").and_then(|p| p.get("version")))
        .or_else(|| valid_str(workspace_package.and_then(|p| p.get("version"))))
        .or_else(|| first_internal_version(doc.get("dependencies")))
        .or_else(|| first_internal_version(workspace.and_then(|w| w.get("dependencies"))));

    Ok(found)
}

/// Replace a string value, keeping its surrounding whitespace and comments.
/// Inherited versions (`{ workspace = true }`) are not strings and stay put.
fn set_version(item: &mut Item, new_version: &str) -> bool {
    let Some(value) = item.as_value_mut() else {
        return false;
    };
    match value.as_str() {
        Some(current) if current != new_version => {}
        _ => return false,
    }
    let decor = value.decor().clone();
    *value = Value::from(new_version);
    *value.decor_mut() = decor;
    true
}

fn update_dependencies(table: &mut dyn TableLike, new_version: &str) -> bool {
    let mut modified = false;
    for (_, item) in table.iter_mut() {
        if DependencyEntry::from_item(item).internal_version().is_none() {
            continue;
        }
        if let Some(version) = item.as_table_like_mut().and_then(|t| t.get_mut("version")) {
            modified |= set_version(version, new_version);
        }
    }
    modified
}

/// Apply `new_version` to a `Cargo.toml`.
///
/// Returns the rewritten document, or `None` when every field already
/// matched. Bare-string and path-only dependencies are left as they are.
pub fn update_version(content: &str, path: &Path, new_version: &str) -> Result<Option<String>> {
    let mut doc = parse_document(content, path)?;
    let mut modified = false;

    if let Some(version) = doc.get_mut("package").and_then(|p| p.get_mut("version")) {
        modified |= set_version(version, new_version);
    }

    if let Some(deps) = doc
        .get_mut("dependencies")
        .and_then(Item::as_table_like_mut)
    {
        modified |= update_dependencies(deps, new_version);
    }

    if let Some(workspace) = doc.get_mut("workspace") {
        if let Some(version) = workspace
            .get_mut("package")
            .and_then(|p| p.get_mut("version"))
        {
            modified |= set_version(version, new_version);
        }
        if let Some(deps) = workspace
            .get_mut("dependencies")
            .and_then(Item::as_table_like_mut)
        {
            modified |= update_dependencies(deps, new_version);
        }
    }

    Ok(modified.then(|| doc.to_string()))
}

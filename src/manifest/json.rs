//! npm-style JSON manifests (`package.json`, `jsr.json`, `deno.jsonc`, lockfiles).
//!
//! Files are parsed into a `jsonc_parser` concrete syntax tree, so comments,
//! trailing commas and formatting survive every edit.

use std::path::Path;

use jsonc_parser::cst::{CstInputValue, CstObject, CstObjectProp, CstRootNode};
use jsonc_parser::ParseOptions;

use crate::error::{BumpError, Result};

const LATEST_TAG: &str = "latest";

fn parse(content: &str, path: &Path) -> Result<CstRootNode> {
    CstRootNode::parse(content, &ParseOptions::default())
        .map_err(|e| BumpError::manifest(path.display().to_string(), e.to_string()))
}

fn string_value(prop: &CstObjectProp) -> Option<String> {
    prop.value()?.as_string_lit()?.decoded_value().ok()
}

/// `packages[""]` of a lockfile; any other shape of `packages` has no root
fn lockfile_root(root: &CstObject) -> Option<CstObject> {
    root.object_value("packages")?.object_value("")
}

/// Read the top-level `version`, falling back to `packages[""].version` for lockfiles.
pub fn read_version(content: &str, path: &Path) -> Result<Option<String>> {
    let Some(root) = parse(content, path)?.object_value() else {
        return Ok(None);
    };

    if let Some(version) = root.get("version").as_ref().and_then(string_value) {
        return Ok(Some(version));
    }
    Ok(lockfile_root(&root)
        .and_then(|packages| packages.get("version"))
        .as_ref()
        .and_then(string_value))
}

fn set_string(prop: &CstObjectProp, value: &str) -> bool {
    if string_value(prop).as_deref() == Some(value) {
        return false;
    }
    prop.set_value(CstInputValue::String(value.to_string()));
    true
}

/// Point `publishConfig.tag` at `tag`; `latest` removes it instead. Returns
/// whether anything changed.
fn apply_publish_tag(root: &CstObject, tag: &str) -> bool {
    let Some(config_prop) = root.get("publishConfig") else {
        if tag == LATEST_TAG {
            return false;
        }
        root.append(
            "publishConfig",
            CstInputValue::Object(vec![(
                "tag".to_string(),
                CstInputValue::String(tag.to_string()),
            )]),
        );
        return true;
    };

    let Some(config) = root.object_value("publishConfig") else {
        return false;
    };

    match (config.get("tag"), tag == LATEST_TAG) {
        (None, true) => false,
        (None, false) => {
            config.append("tag", CstInputValue::String(tag.to_string()));
            true
        }
        (Some(existing), true) => {
            if config.properties().len() == 1 {
                config_prop.remove();
            } else {
                existing.remove();
            }
            true
        }
        (Some(existing), false) => set_string(&existing, tag),
    }
}

/// Apply `new_version` (and optionally a publish tag) to a JSON manifest.
///
/// Returns `None` when the file has no top-level `version` or nothing
/// changed. `publish_tag` of `latest` removes `publishConfig.tag`, dropping
/// `publishConfig` too once it is empty.
pub fn update_version(
    content: &str,
    path: &Path,
    new_version: &str,
    publish_tag: Option<&str>,
) -> Result<Option<String>> {
    let tree = parse(content, path)?;
    let Some(root) = tree.object_value() else {
        return Ok(None);
    };
    let Some(version) = root.get("version") else {
        return Ok(None);
    };

    let mut changed = set_string(&version, new_version);
    if let Some(lock_version) = lockfile_root(&root).and_then(|packages| packages.get("version")) {
        changed |= set_string(&lock_version, new_version);
    }
    if let Some(tag) = publish_tag {
        changed |= apply_publish_tag(&root, tag);
    }

    let output = tree.to_string();
    Ok((changed && output != content).then_some(output))
}

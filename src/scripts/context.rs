use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::operation::OperationState;

/// Version details exposed to scripts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptContext {
    pub current_version: String,
    pub new_version: String,
    /// Release kind, when a named kind produced the new version
    pub release: Option<String>,
    pub tag_name: Option<String>,
}

impl ScriptContext {
    pub fn from_state(state: &OperationState) -> Self {
        ScriptContext {
            current_version: state.current_version.clone().unwrap_or_default(),
            new_version: state.new_version.clone().unwrap_or_default(),
            release: state.release.map(|r| r.to_string()),
            tag_name: state.tag_name.clone(),
        }
    }

    /// Convert context to environment variables for the script
    ///
    /// Maps context fields to BUMP_* environment variables
    pub fn to_env_vars(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();

        env.insert(
            "BUMP_CURRENT_VERSION".to_string(),
            self.current_version.clone(),
        );
        env.insert("BUMP_NEW_VERSION".to_string(), self.new_version.clone());

        if let Some(ref release) = self.release {
            env.insert("BUMP_RELEASE_TYPE".to_string(), release.clone());
        }

        if let Some(ref tag) = self.tag_name {
            env.insert("BUMP_TAG_NAME".to_string(), tag.clone());
        }

        env
    }
}

/// Package manager used for `install`, chosen from the lockfile present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Npm,
    Pnpm,
    Yarn,
    Bun,
}

impl PackageManager {
    const LOCKFILES: [(&'static str, PackageManager); 5] = [
        ("pnpm-lock.yaml", PackageManager::Pnpm),
        ("yarn.lock", PackageManager::Yarn),
        ("bun.lockb", PackageManager::Bun),
        ("bun.lock", PackageManager::Bun),
        ("package-lock.json", PackageManager::Npm),
    ];

    /// Detect from lockfiles in `cwd`, falling back to npm
    pub fn detect(cwd: &Path) -> Self {
        Self::LOCKFILES
            .iter()
            .find(|(file, _)| cwd.join(file).is_file())
            .map(|(_, pm)| *pm)
            .unwrap_or(PackageManager::Npm)
    }

    pub fn name(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Yarn => "yarn",
            PackageManager::Bun => "bun",
        }
    }

    pub fn install_command(&self) -> String {
        format!("{} install", self.name())
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{StateUpdate, USER_SOURCE};
    use crate::release::ReleaseType;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_context_from_state() {
        let state = OperationState::default()
            .apply(StateUpdate::CurrentVersion {
                version: "1.2.3".into(),
                source: USER_SOURCE.into(),
            })
            .unwrap()
            .apply(StateUpdate::NewVersion {
                version: "1.3.0".into(),
                release: Some(ReleaseType::Minor),
            })
            .unwrap();

        let env = ScriptContext::from_state(&state).to_env_vars();
        assert_eq!(env.get("BUMP_CURRENT_VERSION"), Some(&"1.2.3".to_string()));
        assert_eq!(env.get("BUMP_NEW_VERSION"), Some(&"1.3.0".to_string()));
        assert_eq!(env.get("BUMP_RELEASE_TYPE"), Some(&"minor".to_string()));
        assert!(env.get("BUMP_TAG_NAME").is_none());
    }

    #[test]
    fn test_context_minimal_env() {
        let ctx = ScriptContext {
            current_version: "0.1.0".into(),
            new_version: "0.1.1".into(),
            release: None,
            tag_name: Some("v0.1.1".into()),
        };
        let env = ctx.to_env_vars();
        assert_eq!(env.len(), 3);
        assert_eq!(env.get("BUMP_TAG_NAME"), Some(&"v0.1.1".to_string()));
    }

    #[test]
    fn test_detect_package_manager() {
        let dir = TempDir::new().unwrap();
        assert_eq!(PackageManager::detect(dir.path()), PackageManager::Npm);

        fs::write(dir.path().join("yarn.lock"), "").unwrap();
        assert_eq!(PackageManager::detect(dir.path()), PackageManager::Yarn);

        fs::write(dir.path().join("pnpm-lock.yaml"), "").unwrap();
        assert_eq!(PackageManager::detect(dir.path()), PackageManager::Pnpm);
        assert_eq!(
            PackageManager::detect(dir.path()).install_command(),
            "pnpm install"
        );
    }
}

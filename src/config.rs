use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{BumpError, Result};
use crate::options::{BumpOptions, Switch};
use crate::release::DEFAULT_PREID;

/// Name of the project configuration file
pub const CONFIG_FILE: &str = "bump.toml";

/// Name of the user configuration file inside the config directory
pub const USER_CONFIG_FILE: &str = ".bump.toml";

/// Represents the complete configuration for version-bump.
///
/// Every field has a default, so an empty file is a valid configuration.
/// Command-line flags take precedence over anything set here.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Release type or version to use when none is given on the command line
    #[serde(default)]
    pub release: Option<String>,

    #[serde(default = "default_preid")]
    pub preid: String,

    /// `true`, `false`, or a commit message template
    #[serde(default = "default_enabled")]
    pub commit: Switch,

    /// `true`, `false`, or a tag name template
    #[serde(default = "default_enabled")]
    pub tag: Switch,

    #[serde(default = "default_true")]
    pub push: bool,

    #[serde(default)]
    pub sign: bool,

    #[serde(default)]
    pub all: bool,

    #[serde(default)]
    pub no_git_check: bool,

    #[serde(default)]
    pub no_verify: bool,

    #[serde(default = "default_true")]
    pub confirm: bool,

    #[serde(default)]
    pub recursive: bool,

    #[serde(default)]
    pub install: bool,

    #[serde(default)]
    pub ignore_scripts: bool,

    #[serde(default = "default_true")]
    pub print_commits: bool,

    #[serde(default)]
    pub execute: Option<String>,

    #[serde(default)]
    pub publish_tag: Option<Switch>,

    #[serde(default)]
    pub current_version: Option<String>,

    /// Version offered as the "from config" prompt choice
    #[serde(default)]
    pub custom_version: Option<String>,

    #[serde(default)]
    pub files: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_enabled() -> Switch {
    Switch::Flag(true)
}

fn default_preid() -> String {
    DEFAULT_PREID.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            release: None,
            preid: default_preid(),
            commit: default_enabled(),
            tag: default_enabled(),
            push: true,
            sign: false,
            all: false,
            no_git_check: false,
            no_verify: false,
            confirm: true,
            recursive: false,
            install: false,
            ignore_scripts: false,
            print_commits: true,
            execute: None,
            publish_tag: None,
            current_version: None,
            custom_version: None,
            files: Vec::new(),
        }
    }
}

impl Config {
    /// Turn the configuration into bump options rooted at `cwd`
    pub fn into_options(self, cwd: PathBuf) -> BumpOptions {
        let custom_version = self.custom_version.map(|suggestion| {
            Arc::new(move |_: &semver::Version| Some(suggestion.clone()))
                as crate::options::CustomVersionFn
        });

        BumpOptions {
            release: self.release,
            current_version: self.current_version,
            preid: Some(self.preid),
            commit: self.commit,
            tag: self.tag,
            push: self.push,
            sign: self.sign,
            all: self.all,
            no_git_check: self.no_git_check,
            no_verify: self.no_verify,
            confirm: self.confirm,
            recursive: self.recursive,
            install: self.install,
            ignore_scripts: self.ignore_scripts,
            print_commits: self.print_commits,
            execute: self.execute,
            publish_tag: self.publish_tag,
            files: self.files,
            cwd: Some(cwd),
            interface: true,
            custom_version,
            progress: None,
        }
    }
}

/// Locate the configuration file to use, if any.
///
/// Searched in the following order:
/// 1. Custom path provided as parameter
/// 2. `bump.toml` in the working directory
/// 3. `.bump.toml` in the user config directory
pub fn find_config(config_path: Option<&Path>, cwd: &Path) -> Option<PathBuf> {
    if let Some(path) = config_path {
        return Some(path.to_path_buf());
    }

    let local = cwd.join(CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join(USER_CONFIG_FILE))
        .filter(|path| path.is_file())
}

/// Loads configuration from file or returns defaults.
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
/// * `cwd` - Directory searched for `bump.toml`
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed, or an explicit path is missing
pub fn load_config(config_path: Option<&Path>, cwd: &Path) -> Result<Config> {
    let Some(path) = find_config(config_path, cwd) else {
        tracing::debug!("no configuration file found, using defaults");
        return Ok(Config::default());
    };

    tracing::debug!(path = %path.display(), "loading configuration");
    let content = fs::read_to_string(&path)
        .map_err(|e| BumpError::config(format!("Cannot read {}: {}", path.display(), e)))?;

    toml::from_str(&content)
        .map_err(|e| BumpError::config(format!("Invalid {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_switch_accepts_bool_or_template() {
        let config: Config = toml::from_str("commit = \"release %s\"\ntag = false\n").unwrap();
        assert_eq!(config.commit, Switch::Value("release %s".into()));
        assert_eq!(config.tag, Switch::Flag(false));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(toml::from_str::<Config>("comit = true").is_err());
    }

    #[test]
    fn test_custom_version_becomes_hook() {
        let config = Config {
            custom_version: Some("3.0.0".into()),
            ..Config::default()
        };
        let options = config.into_options(PathBuf::from("."));
        let hook = options.custom_version.unwrap();
        assert_eq!(
            hook(&semver::Version::new(1, 0, 0)),
            Some("3.0.0".to_string())
        );
    }
}

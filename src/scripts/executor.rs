use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{BumpError, Result};
use crate::scripts::{PackageManager, ScriptContext};

#[derive(Deserialize)]
struct PackageScripts {
    #[serde(default)]
    scripts: HashMap<String, String>,
}

/// Runs shell commands and npm scripts for a bump
pub struct ScriptExecutor;

impl ScriptExecutor {
    /// Execute a shell command with the given context
    ///
    /// The command runs through `sh -c` (`cmd /C` on Windows) in `cwd`, with
    /// environment variables set from the context. Any non-zero exit code is
    /// treated as a failure.
    ///
    /// # Arguments
    /// * `command` - Shell command line
    /// * `cwd` - Directory to run in
    /// * `context` - Version details exported as `BUMP_*` variables
    ///
    /// # Returns
    /// * `Ok(stdout)` if the command succeeds (exit code 0)
    /// * `Err` if the shell cannot start or the command returns non-zero
    pub fn execute(command: &str, cwd: &Path, context: &ScriptContext) -> Result<String> {
        let (shell, shell_arg) = if cfg!(windows) {
            ("cmd", "/C")
        } else {
            ("sh", "-c")
        };

        tracing::debug!(command, cwd = %cwd.display(), "running command");

        let output = Command::new(shell)
            .arg(shell_arg)
            .arg(command)
            .current_dir(cwd)
            .envs(context.to_env_vars())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| BumpError::command(format!("Failed to execute {}: {}", command, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            return Err(BumpError::command(format!(
                "Command `{}` failed with exit code {}\nStdout: {}\nStderr: {}",
                command,
                output.status.code().unwrap_or(-1),
                stdout.trim(),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Whether `package.json` in `cwd` defines the named script
    ///
    /// A missing `package.json` defines no scripts.
    pub fn has_npm_script(cwd: &Path, name: &str) -> Result<bool> {
        let path = cwd.join("package.json");
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        let manifest: PackageScripts = serde_json::from_str(&content)
            .map_err(|e| BumpError::manifest(path.display().to_string(), e.to_string()))?;
        Ok(manifest.scripts.contains_key(name))
    }

    /// Run an npm lifecycle script if `package.json` defines it
    ///
    /// # Returns
    /// * `Ok(true)` if the script ran and succeeded
    /// * `Ok(false)` if there is no such script
    pub fn run_npm_script(name: &str, cwd: &Path, context: &ScriptContext) -> Result<bool> {
        if !Self::has_npm_script(cwd, name)? {
            tracing::debug!(script = name, "npm script not defined, skipping");
            return Ok(false);
        }

        Self::execute(&format!("npm run {}", name), cwd, context)?;
        Ok(true)
    }

    /// Install dependencies with the package manager the lockfile names
    pub fn install(cwd: &Path, context: &ScriptContext) -> Result<PackageManager> {
        let manager = PackageManager::detect(cwd);
        Self::execute(&manager.install_command(), cwd, context)?;
        Ok(manager)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ctx() -> ScriptContext {
        ScriptContext {
            current_version: "1.0.0".to_string(),
            new_version: "1.0.1".to_string(),
            release: Some("patch".to_string()),
            tag_name: None,
        }
    }

    #[test]
    fn test_failing_command() {
        let dir = TempDir::new().unwrap();
        let result = ScriptExecutor::execute("exit 3", dir.path(), &ctx());
        let err = result.unwrap_err();
        assert!(matches!(err, BumpError::Command(_)));
        assert!(err.to_string().contains("exit code 3"));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_sees_context() {
        let dir = TempDir::new().unwrap();
        let out = ScriptExecutor::execute(
            "echo \"$BUMP_CURRENT_VERSION->$BUMP_NEW_VERSION\"",
            dir.path(),
            &ctx(),
        )
        .unwrap();
        assert_eq!(out.trim(), "1.0.0->1.0.1");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_runs_in_cwd() {
        let dir = TempDir::new().unwrap();
        ScriptExecutor::execute("touch marker", dir.path(), &ctx()).unwrap();
        assert!(dir.path().join("marker").is_file());
    }

    #[test]
    fn test_has_npm_script() {
        let dir = TempDir::new().unwrap();
        assert!(!ScriptExecutor::has_npm_script(dir.path(), "version").unwrap());

        fs::write(
            dir.path().join("package.json"),
            r#"{ "version": "1.0.0", "scripts": { "postversion": "echo done" } }"#,
        )
        .unwrap();
        assert!(ScriptExecutor::has_npm_script(dir.path(), "postversion").unwrap());
        assert!(!ScriptExecutor::has_npm_script(dir.path(), "version").unwrap());
    }

    #[test]
    fn test_missing_script_is_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), r#"{ "version": "1.0.0" }"#).unwrap();
        assert!(!ScriptExecutor::run_npm_script("version", dir.path(), &ctx()).unwrap());
    }

    #[test]
    fn test_malformed_package_json() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), "{ not json").unwrap();
        let err = ScriptExecutor::has_npm_script(dir.path(), "version").unwrap_err();
        assert!(matches!(err, BumpError::Manifest { .. }));
    }
}

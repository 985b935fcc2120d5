use std::path::Path;
use std::process::Command;

use crate::error::{BumpError, Result};

/// Run `git` with the given arguments in `cwd`.
///
/// A non-zero exit becomes [`BumpError::Command`] carrying the captured output.
pub fn run_git<S: AsRef<str>>(cwd: &Path, args: &[S]) -> Result<String> {
    let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
    tracing::debug!(cwd = %cwd.display(), "git {}", args.join(" "));

    let output = Command::new("git")
        .args(&args)
        .current_dir(cwd)
        .output()
        .map_err(|e| BumpError::command(format!("Failed to run git: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        return Err(BumpError::command(format!(
            "git {} exited with code {}\nStdout: {}\nStderr: {}",
            args.join(" "),
            output.status.code().unwrap_or(-1),
            stdout.trim(),
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Arguments for `git commit`
pub fn commit_args(request: &super::CommitRequest) -> Vec<String> {
    let mut args = vec!["commit".to_string(), "--allow-empty".to_string()];
    if request.all {
        args.push("--all".into());
    }
    if request.no_verify {
        args.push("--no-verify".into());
    }
    if request.sign {
        args.push("--gpg-sign".into());
    }
    args.push("--message".into());
    args.push(request.message.clone());
    if !request.all {
        args.extend(request.files.iter().map(|f| f.to_string_lossy().into_owned()));
    }
    args
}

/// Arguments for `git tag`
pub fn tag_args(request: &super::TagRequest) -> Vec<String> {
    let mut args = vec![
        "tag".to_string(),
        "--annotate".to_string(),
        "--message".to_string(),
        request.message.clone(),
        request.name.clone(),
    ];
    if request.sign {
        args.push("--sign".into());
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::{CommitRequest, TagRequest};
    use std::path::PathBuf;

    #[test]
    fn test_commit_args_lists_files() {
        let request = CommitRequest {
            message: "chore: release v1.0.1".into(),
            files: vec![PathBuf::from("package.json"), PathBuf::from("jsr.json")],
            all: false,
            no_verify: true,
            sign: false,
        };
        assert_eq!(
            commit_args(&request),
            vec![
                "commit",
                "--allow-empty",
                "--no-verify",
                "--message",
                "chore: release v1.0.1",
                "package.json",
                "jsr.json"
            ]
        );
    }

    #[test]
    fn test_commit_all_skips_file_list() {
        let request = CommitRequest {
            message: "m".into(),
            files: vec![PathBuf::from("package.json")],
            all: true,
            no_verify: false,
            sign: true,
        };
        assert_eq!(
            commit_args(&request),
            vec!["commit", "--allow-empty", "--all", "--gpg-sign", "--message", "m"]
        );
    }

    #[test]
    fn test_tag_args() {
        let request = TagRequest {
            name: "v1.0.1".into(),
            message: "chore: release v1.0.1".into(),
            sign: true,
        };
        assert_eq!(
            tag_args(&request),
            vec![
                "tag",
                "--annotate",
                "--message",
                "chore: release v1.0.1",
                "v1.0.1",
                "--sign"
            ]
        );
    }

    #[test]
    fn test_failed_git_is_command_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = run_git(dir.path(), &["definitely-not-a-git-command"]).unwrap_err();
        assert!(matches!(err, BumpError::Command(_)));
    }
}

use console::style;

use crate::conventional::GitCommit;
use crate::git::format_version_string;
use crate::operation::{OperationState, ProgressEvent};
use crate::options::NormalizedOptions;

/// Commits shown before the list is cut off
const MAX_COMMITS_SHOWN: usize = 50;

pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

pub fn display_warning(message: &str) {
    eprintln!("{} {}", style("⚠").yellow(), style(message).yellow());
}

pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// One line describing a progress event
pub fn format_progress(event: ProgressEvent, state: &OperationState) -> String {
    let new_version = state.new_version.as_deref().unwrap_or_default();
    match event {
        ProgressEvent::FileUpdated => format!(
            "{} Updated {} to {}",
            style("✓").green(),
            last_path(&state.updated_files),
            new_version
        ),
        ProgressEvent::FileSkipped => format!(
            "{} {} did not need to be updated",
            style("-").dim(),
            last_path(&state.skipped_files)
        ),
        ProgressEvent::GitCommit => format!("{} Git commit", style("✓").green()),
        ProgressEvent::GitTag => format!("{} Git tag", style("✓").green()),
        ProgressEvent::GitPush => format!("{} Git push", style("✓").green()),
        ProgressEvent::NpmScript => format!(
            "{} Npm run {}",
            style("✓").green(),
            state.script.as_deref().unwrap_or_default()
        ),
    }
}

fn last_path(paths: &[std::path::PathBuf]) -> String {
    paths
        .last()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}

pub fn display_progress(event: ProgressEvent, state: &OperationState) {
    println!("{}", format_progress(event, state));
}

/// `hash type(scope)!: description`, colored by type
pub fn format_commit(commit: &GitCommit) -> String {
    let kind = match commit.r#type.as_str() {
        "feat" => style(commit.r#type.as_str()).green(),
        "fix" => style(commit.r#type.as_str()).cyan(),
        _ => style(commit.r#type.as_str()).dim(),
    };
    let scope = commit
        .scope
        .as_deref()
        .map(|s| format!("({})", s))
        .unwrap_or_default();
    let breaking = if commit.is_breaking {
        style("!").red().bold().to_string()
    } else {
        String::new()
    };

    format!(
        "{} {}{}{}: {}",
        style(&commit.short_hash).yellow(),
        kind,
        style(scope).dim(),
        breaking,
        commit.description
    )
}

pub fn display_commits(commits: &[GitCommit]) {
    if commits.is_empty() {
        return;
    }

    println!(
        "\n{}",
        style(format!("{} commits since the last release:", commits.len())).bold()
    );
    for commit in commits.iter().take(MAX_COMMITS_SHOWN) {
        println!("  {}", format_commit(commit));
    }
    if commits.len() > MAX_COMMITS_SHOWN {
        println!(
            "  {}",
            style(format!("... and {} more", commits.len() - MAX_COMMITS_SHOWN)).dim()
        );
    }
    println!();
}

/// The lines shown before asking to proceed
pub fn format_summary(options: &NormalizedOptions, state: &OperationState) -> Vec<String> {
    let mut lines = Vec::new();
    let new_version = state.new_version.as_deref().unwrap_or_default();

    for file in &options.files {
        lines.push(format!("{:>8} {}", "files", style(file.display()).bold()));
    }
    if let Some(commit) = &options.commit {
        let message = format_version_string(&commit.message, new_version);
        let scope = if commit.all {
            format!("{} --all", message)
        } else {
            message
        };
        lines.push(format!("{:>8} {}", "commit", style(scope).bold()));
    }
    if let Some(tag) = &options.tag {
        let name = format_version_string(&tag.name, new_version);
        lines.push(format!("{:>8} {}", "tag", style(name).bold()));
    }
    if let Some(command) = &options.execute {
        lines.push(format!("{:>8} {}", "execute", style(command).bold()));
    }
    if let Some(publish_tag) = &state.publish_tag {
        lines.push(format!("{:>8} {}", "publish", style(publish_tag).bold()));
    }
    if options.push {
        lines.push(format!("{:>8} {}", "push", style("yes").cyan()));
    }

    lines.push(String::new());
    lines.push(format!(
        "{:>8} {}",
        "from",
        style(state.current_version.as_deref().unwrap_or_default()).bold()
    ));
    lines.push(format!("{:>8} {}", "to", style(new_version).green().bold()));
    lines
}

pub fn display_summary(options: &NormalizedOptions, state: &OperationState) {
    println!();
    for line in format_summary(options, state) {
        println!("{}", line);
    }
    println!();
}

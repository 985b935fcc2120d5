use clap::ArgAction;
use std::path::PathBuf;

use crate::config::Config;
use crate::options::{BumpOptions, Switch};
use crate::release::ReleaseType;
use crate::version;

#[derive(Debug, Clone, Default, PartialEq, clap::Parser)]
#[command(
    name = "bump",
    version,
    about = "Bump manifest versions, then commit, tag and push the release"
)]
pub struct Args {
    #[arg(
        value_name = "RELEASE|FILES",
        help = "Release type, `prompt` or a version, followed by the files to bump"
    )]
    pub positional: Vec<String>,

    #[arg(long, help = "ID for prerelease versions")]
    pub preid: Option<String>,

    #[arg(long, help = "Commit all changed files, not just the bumped ones")]
    pub all: bool,

    #[arg(long, help = "Skip the clean working tree check")]
    pub no_git_check: bool,

    #[arg(
        short,
        long,
        value_name = "MSG",
        num_args = 0..=1,
        default_missing_value = "",
        help = "Commit, optionally with a message template (%s is the version)"
    )]
    pub commit: Option<String>,

    #[arg(long, conflicts_with = "commit", help = "Skip the commit")]
    pub no_commit: bool,

    #[arg(
        short,
        long,
        value_name = "NAME",
        num_args = 0..=1,
        default_missing_value = "",
        help = "Tag, optionally with a tag name template (%s is the version)"
    )]
    pub tag: Option<String>,

    #[arg(long, conflicts_with = "tag", help = "Skip the tag")]
    pub no_tag: bool,

    #[arg(long, help = "Sign the commit and tag")]
    pub sign: bool,

    #[arg(long, help = "Install dependencies after bumping")]
    pub install: bool,

    #[arg(short, long, help = "Push to the remote")]
    pub push: bool,

    #[arg(long, conflicts_with = "push", help = "Do not push")]
    pub no_push: bool,

    #[arg(short, long, help = "Skip confirmation")]
    pub yes: bool,

    #[arg(short, long, help = "Bump package.json files of workspace packages too")]
    pub recursive: bool,

    #[arg(long, help = "Bypass git commit hooks")]
    pub no_verify: bool,

    #[arg(long, help = "Do not run npm lifecycle scripts")]
    pub ignore_scripts: bool,

    #[arg(short, long, help = "Quiet mode")]
    pub quiet: bool,

    #[arg(long, value_name = "VERSION", help = "Use this as the current version")]
    pub current_version: Option<String>,

    #[arg(long, help = "Print recent commits")]
    pub print_commits: bool,

    #[arg(long, conflicts_with = "print_commits", help = "Do not print recent commits")]
    pub no_print_commits: bool,

    #[arg(
        short = 'x',
        long,
        value_name = "COMMAND",
        help = "Command to run after the version bump"
    )]
    pub execute: Option<String>,

    #[arg(
        long,
        value_name = "TAG",
        num_args = 0..=1,
        default_missing_value = "",
        help = "Set publishConfig.tag in package.json, asking when no tag is given"
    )]
    pub publish_tag: Option<String>,

    #[arg(long, value_name = "PATH", help = "Custom configuration file path")]
    pub config: Option<PathBuf>,

    #[arg(short, long, action = ArgAction::Count, help = "More diagnostic output (-v, -vv)")]
    pub verbose: u8,
}

/// Whether a positional argument names a release rather than a file
pub fn is_release(arg: &str) -> bool {
    arg == "prompt" || arg.parse::<ReleaseType>().is_ok() || version::is_valid(arg)
}

fn switch_flag(value: Option<&str>, disabled: bool) -> Option<Switch> {
    if disabled {
        return Some(Switch::Flag(false));
    }
    value.map(|v| match v {
        "" => Switch::Flag(true),
        v => Switch::Value(v.to_string()),
    })
}

impl Args {
    /// Split positionals into the release and the files
    pub fn release_and_files(&self) -> (Option<String>, Vec<String>) {
        match self.positional.split_first() {
            Some((first, rest)) if is_release(first) => (Some(first.clone()), rest.to_vec()),
            _ => (None, self.positional.clone()),
        }
    }

    /// Merge flags over the loaded configuration
    pub fn into_options(self, config: Config, cwd: PathBuf) -> BumpOptions {
        let (release, files) = self.release_and_files();
        let mut options = config.into_options(cwd);

        if release.is_some() {
            options.release = release;
        }
        if !files.is_empty() {
            if self.recursive || options.recursive {
                crate::ui::display_warning(
                    "The --recursive option is ignored when files are specified",
                );
            }
            options.files = files;
        }
        if let Some(preid) = self.preid {
            options.preid = Some(preid);
        }
        if let Some(commit) = switch_flag(self.commit.as_deref(), self.no_commit) {
            options.commit = commit;
        }
        if let Some(tag) = switch_flag(self.tag.as_deref(), self.no_tag) {
            options.tag = tag;
        }
        if let Some(publish_tag) = switch_flag(self.publish_tag.as_deref(), false) {
            options.publish_tag = Some(publish_tag);
        }
        if self.push {
            options.push = true;
        }
        if self.no_push {
            options.push = false;
        }
        if self.print_commits {
            options.print_commits = true;
        }
        if self.no_print_commits {
            options.print_commits = false;
        }
        if self.current_version.is_some() {
            options.current_version = self.current_version;
        }
        if self.execute.is_some() {
            options.execute = self.execute;
        }

        options.sign |= self.sign;
        options.all |= self.all;
        options.no_git_check |= self.no_git_check;
        options.no_verify |= self.no_verify;
        options.install |= self.install;
        options.ignore_scripts |= self.ignore_scripts;
        options.recursive |= self.recursive;
        options.confirm &= !self.yes;

        options
    }
}

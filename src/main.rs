use anyhow::{Context, Result};
use clap::Parser;
use console::Term;
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use version_bump::cli::{version_bump, Args};
use version_bump::config::load_config;
use version_bump::error::{BumpError, ExitCode};
use version_bump::git::Git2Repository;
use version_bump::ui::{self, TerminalPrompter};

/// Diagnostics go to stderr; `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "version_bump=debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: Args) -> Result<()> {
    let quiet = args.quiet;
    let cwd = std::env::current_dir().context("Cannot determine the working directory")?;
    let config = load_config(args.config.as_deref(), &cwd)?;

    let mut options = args.into_options(config, cwd.clone());
    options.interface = Term::stderr().is_term();
    if !quiet {
        options.progress = Some(Arc::new(ui::display_progress));
    }

    let repo = Git2Repository::open(&cwd)
        .with_context(|| format!("{} is not inside a git repository", cwd.display()))?;

    let operation = version_bump(options, &repo, &TerminalPrompter)?;

    if !quiet {
        let state = operation.state();
        ui::display_success(&format!(
            "Bumped {} to {}",
            state.current_version.as_deref().unwrap_or_default(),
            state.new_version.as_deref().unwrap_or_default()
        ));
    }
    Ok(())
}

fn exit_code(err: &anyhow::Error) -> ExitCode {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<BumpError>())
        .map(BumpError::exit_code)
        .unwrap_or(ExitCode::FatalError)
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            let _ = e.print();
            process::exit(ExitCode::InvalidArgument as i32);
        }
    };

    init_tracing(args.verbose);

    if let Err(err) = run(args) {
        match err.downcast_ref::<BumpError>() {
            Some(BumpError::Cancelled) => ui::display_warning("Cancelled"),
            _ => ui::display_error(&format!("{:#}", err)),
        }
        process::exit(exit_code(&err) as i32);
    }
}

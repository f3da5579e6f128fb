use std::path::{Path, PathBuf};
use std::process::ExitCode;

use zetteldev_experiment::{
    display_for_scaffold_error, exit_code_for_scaffold_error, repo_web_url, resolve, scaffold,
    show_experiment, today_utc, GhIssueSource, IdentitySource, IssueRecord, ProjectConfig,
    Resolution, ResolveContext, ScaffoldError, ScaffoldPlan, TargetInput, TerminalPrompter,
    EXPERIMENTS_DIR,
};

use crate::cli::Cli;

fn project_root() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn fail(e: &ScaffoldError) -> ExitCode {
    let use_err = zetteldev_experiment::color_enabled_stderr();
    zetteldev_experiment::log_error_stderr(use_err, &display_for_scaffold_error(e));
    ExitCode::from(exit_code_for_scaffold_error(e))
}

fn print_listing(cli: &Cli, issues: &[IssueRecord]) {
    let use_err = zetteldev_experiment::color_enabled_stderr();
    if issues.is_empty() {
        println!("no open issues without experiments.");
        return;
    }
    if !cli.quiet {
        zetteldev_experiment::log_info_stderr(use_err, "Open issues without experiments:");
    }
    for issue in issues {
        println!("#{}\t{}", issue.number, issue.title);
    }
    if !cli.quiet {
        zetteldev_experiment::log_info_stderr(
            use_err,
            "Run `zetteldev-experiment <issue-number>` or `zetteldev-experiment <name>` \
             to create one.",
        );
    }
}

pub fn run_scaffold_command(cli: &Cli) -> ExitCode {
    let root = project_root();
    let experiments_root = root.join(EXPERIMENTS_DIR);
    let config = ProjectConfig::load(&root);
    let issues = GhIssueSource::new(
        ProjectConfig::issue_command(),
        &root,
        ProjectConfig::issue_timeout(),
    );
    let interactive = !cli.non_interactive
        && atty::is(atty::Stream::Stdin)
        && atty::is(atty::Stream::Stderr);
    let input = TargetInput::parse(cli.target.as_deref());
    tracing::debug!(
        ?input,
        interactive,
        base_url = %config.base_url,
        source = ?config.base_url_source,
        "resolving experiment"
    );
    if cli.verbose {
        zetteldev_experiment::log_info_stderr(
            zetteldev_experiment::color_enabled_stderr(),
            &format!(
                "base URL {} (from {})",
                config.base_url,
                config.base_url_source.describe()
            ),
        );
    }

    let ctx = ResolveContext {
        experiments_root: &experiments_root,
        issues: &issues,
        interactive,
    };
    let mut prompter = TerminalPrompter::stdio();
    let identity = match resolve(&input, &ctx, &mut prompter) {
        Ok(Resolution::Resolved(id)) => id,
        Ok(Resolution::Listed(available)) => {
            print_listing(cli, &available);
            return ExitCode::from(0);
        }
        Err(e) => return fail(&e),
    };

    let web = if identity.source() == IdentitySource::Issue {
        repo_web_url(&root)
    } else {
        None
    };
    let plan = match ScaffoldPlan::new(identity, &config.base_url, &today_utc(), web.as_deref()) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    match scaffold(&experiments_root, &plan) {
        Ok(outcome) => {
            let shown = Path::new(EXPERIMENTS_DIR).join(&outcome.name);
            println!(
                "Experiment '{}' created successfully at {}.",
                outcome.name,
                shown.display()
            );
            println!("URL: {}", outcome.url);
            if cli.verbose {
                let use_err = zetteldev_experiment::color_enabled_stderr();
                for f in &outcome.files {
                    zetteldev_experiment::log_info_stderr(
                        use_err,
                        &format!("  wrote {}", shown.join(f).display()),
                    );
                }
            }
            ExitCode::from(0)
        }
        Err(e) => fail(&e),
    }
}

pub fn run_show_command(name: &str) -> ExitCode {
    let experiments_root = project_root().join(EXPERIMENTS_DIR);
    match show_experiment(&experiments_root, name) {
        Ok(meta) => {
            println!("name={}", name);
            for key in ["token", "url", "created"] {
                if let Some(v) = meta.get(key) {
                    println!("{}={}", key, v);
                }
            }
            ExitCode::from(0)
        }
        Err(e) => fail(&e),
    }
}

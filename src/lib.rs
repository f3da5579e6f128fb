//! Scaffolding for zetteldev experiment folders.
//!
//! An experiment is resolved to a canonical name (manual, from an issue number, or chosen
//! interactively), given a random access token and URL, and written out as a fixed set of
//! rendered templates under `experiments/<name>/`.

mod color;
mod config;
mod errors;
mod identity;
mod issues;
mod logging;
mod scaffold;
pub mod templates;
pub mod util;

pub use color::{
    color_enabled_stderr, log_error_stderr, log_info_stderr, paint, parse_color_mode,
    set_color_mode, ColorMode,
};
pub use config::{
    validate_base_url, BaseUrlSource, ProjectConfig, DEFAULT_BASE_URL, PROJECT_DESCRIPTOR,
};
pub use errors::{
    display_for_scaffold_error, exit_code_for_io_error, exit_code_for_scaffold_error,
    ScaffoldError,
};
pub use identity::{
    available_issues, folder_issue_number, resolve, scaffolded_issue_numbers, slugify,
    ExperimentIdentity, IdentitySource, IssueChoice, Prompter, Resolution, ResolveContext,
    TargetInput, TerminalPrompter, MAX_SLUG_LEN,
};
pub use issues::{
    issue_link, parse_issue, parse_issue_list, remote_to_web_url, repo_web_url, GhIssueSource,
    IssueRecord, IssueSource, StaticIssueSource,
};
pub use logging::init_logging;
pub use scaffold::{
    parse_metadata, read_metadata, scaffold, show_experiment, today_utc, ScaffoldOutcome,
    ScaffoldPlan, ScaffoldState, EXPERIMENTS_DIR, METADATA_FILE, SUBDIRS,
};
pub use util::token::{build_url, make_default_token, make_token, DEFAULT_TOKEN_LEN};

//! Experiment folder creation.
//!
//! CollisionCheck -> DirectoryCreate -> FileWrite(xN) -> Done, with Aborted reachable from
//! every state. Identity resolution has already happened when a plan exists.
//!
//! The tree is populated in a hidden staging directory next to its final location and
//! renamed into place only after every file is written, so a failed run leaves no
//! half-filled experiment behind.
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use time::macros::format_description;
use time::OffsetDateTime;

use crate::errors::ScaffoldError;
use crate::identity::{ExperimentIdentity, IdentitySource};
use crate::issues::issue_link;
use crate::templates::quote::{python_str, shell_word, snakemake_braces, yaml_scalar};
use crate::templates::{self, param, Params, TemplateId, TEMPLATE_SET_VERSION};
use crate::util::token::{build_url, make_default_token};

pub const EXPERIMENTS_DIR: &str = "experiments";
pub const METADATA_FILE: &str = ".zetteldev";
pub const SUBDIRS: [&str; 3] = ["processed_data", "figures", "tests"];
const STAGING_PREFIX: &str = ".zetteldev-staging-";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaffoldState {
    CollisionCheck,
    DirectoryCreate,
    FileWrite,
    Done,
    Aborted,
}

fn enter(state: ScaffoldState, name: &str) {
    tracing::debug!(?state, experiment = name, "scaffold state");
}

/// Today's date (UTC) as `YYYY-MM-DD`.
pub fn today_utc() -> String {
    let fmt = format_description!("[year]-[month]-[day]");
    OffsetDateTime::now_utc()
        .date()
        .format(fmt)
        .unwrap_or_else(|_| "1970-01-01".to_string())
}

/// Everything needed to write one experiment: identity, token, URL and rendered parameters.
#[derive(Debug, Clone)]
pub struct ScaffoldPlan {
    identity: ExperimentIdentity,
    token: String,
    url: String,
    params: Params,
}

impl ScaffoldPlan {
    /// Draw a fresh token and derive the URL and template parameters.
    pub fn new(
        identity: ExperimentIdentity,
        base_url: &str,
        date: &str,
        repo_web_url: Option<&str>,
    ) -> Result<Self, ScaffoldError> {
        let token = make_default_token()?;
        Ok(Self::with_token(identity, base_url, date, token, repo_web_url))
    }

    pub fn with_token(
        identity: ExperimentIdentity,
        base_url: &str,
        date: &str,
        token: String,
        repo_web_url: Option<&str>,
    ) -> Self {
        let name = identity.name();
        let url = build_url(base_url, name, &token);
        let html = format!("{}.html", name);
        let render_cmd = format!("quarto render report.qmd --output {}", shell_word(&html));
        let mut params = Params::new()
            .with(param::EXPERIMENT_NAME, name)
            .with(param::EXPERIMENT_NAME_LITERAL, python_str(name))
            .with(param::EXPERIMENT_IDENT, identity.ident())
            .with(param::REPORT_TITLE_YAML, yaml_scalar(&format!("{} Report", name)))
            .with(param::REPORT_HTML_LITERAL, python_str(&snakemake_braces(&html)))
            .with(param::RENDER_COMMAND_LITERAL, python_str(&snakemake_braces(&render_cmd)))
            .with(param::TOKEN, token.clone())
            .with(param::URL, url.clone())
            .with(param::URL_YAML, yaml_scalar(&url))
            .with(param::DATE, date)
            .with(param::TEMPLATE_VERSION, TEMPLATE_SET_VERSION.to_string());
        if let Some(n) = identity.issue_number() {
            params.insert(param::ISSUE_NUMBER, n.to_string());
            params.insert(param::ISSUE_TITLE, identity.issue_title().unwrap_or_default());
            params.insert(param::ISSUE_BODY, identity.issue_body().unwrap_or_default());
            params.insert(param::ISSUE_LINK, issue_link(repo_web_url, n));
        }
        Self {
            identity,
            token,
            url,
            params,
        }
    }

    pub fn identity(&self) -> &ExperimentIdentity {
        &self.identity
    }

    pub fn name(&self) -> &str {
        self.identity.name()
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Files relative to the experiment folder, in write order.
    pub fn files(&self) -> Vec<(PathBuf, TemplateId)> {
        let from_issue = self.identity.source() == IdentitySource::Issue;
        let (design_md, design_org) = if from_issue {
            (TemplateId::DesignMdFromIssue, TemplateId::DesignOrgFromIssue)
        } else {
            (TemplateId::DesignMd, TemplateId::DesignOrg)
        };
        vec![
            (PathBuf::from(METADATA_FILE), TemplateId::Metadata),
            (PathBuf::from("design.md"), design_md),
            (PathBuf::from("design.org"), design_org),
            (PathBuf::from("main.py"), TemplateId::MainScript),
            (PathBuf::from("report.qmd"), TemplateId::Report),
            (PathBuf::from("Snakefile"), TemplateId::Pipeline),
            (
                Path::new("tests").join(format!("test_{}.py", self.identity.ident())),
                TemplateId::BasicTest,
            ),
            (
                PathBuf::from(format!("scratchpad_{}.ipynb", self.name())),
                TemplateId::Notebook,
            ),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldOutcome {
    pub name: String,
    pub token: String,
    pub url: String,
    pub path: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Removes the staging directory unless it was renamed into place.
struct StagingDir {
    path: PathBuf,
    armed: bool,
}

impl StagingDir {
    fn create(experiments_root: &Path, plan: &ScaffoldPlan) -> io::Result<Self> {
        let path = experiments_root.join(format!("{}{}", STAGING_PREFIX, plan.token()));
        fs::create_dir(&path)?;
        Ok(Self { path, armed: true })
    }

    fn commit(mut self, target: &Path) -> io::Result<()> {
        fs::rename(&self.path, target)?;
        self.armed = false;
        Ok(())
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = fs::remove_dir_all(&self.path) {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to remove staging directory"
                );
            }
        }
    }
}

fn collision_check(target: &Path, name: &str) -> Result<(), ScaffoldError> {
    // symlink_metadata also catches dangling symlinks at the target path.
    if fs::symlink_metadata(target).is_ok() {
        return Err(ScaffoldError::AlreadyExists(name.to_string()));
    }
    Ok(())
}

/// Create `experiments_root/<name>/` with the fixed subdirectories and every templated file.
pub fn scaffold(
    experiments_root: &Path,
    plan: &ScaffoldPlan,
) -> Result<ScaffoldOutcome, ScaffoldError> {
    let name = plan.name();
    let span = tracing::info_span!("scaffold", experiment = name);
    let _enter = span.enter();

    let result = run_states(experiments_root, plan);
    if let Err(ref e) = result {
        enter(ScaffoldState::Aborted, name);
        tracing::debug!(error = %e, "scaffold aborted");
    }
    result
}

fn run_states(
    experiments_root: &Path,
    plan: &ScaffoldPlan,
) -> Result<ScaffoldOutcome, ScaffoldError> {
    let name = plan.name();
    let target = experiments_root.join(name);

    enter(ScaffoldState::CollisionCheck, name);
    collision_check(&target, name)?;

    enter(ScaffoldState::DirectoryCreate, name);
    fs::create_dir_all(experiments_root)?;
    let staging = StagingDir::create(experiments_root, plan).map_err(|source| {
        ScaffoldError::PartialWriteFailure {
            path: target.clone(),
            source,
        }
    })?;
    for sub in SUBDIRS {
        fs::create_dir(staging.path.join(sub)).map_err(|source| {
            ScaffoldError::PartialWriteFailure {
                path: target.join(sub),
                source,
            }
        })?;
    }

    enter(ScaffoldState::FileWrite, name);
    let mut written = Vec::new();
    for (rel, id) in plan.files() {
        let contents = templates::render(id, plan.params())?;
        fs::write(staging.path.join(&rel), contents).map_err(|source| {
            ScaffoldError::PartialWriteFailure {
                path: target.join(&rel),
                source,
            }
        })?;
        tracing::trace!(file = %rel.display(), template = id.as_str(), "wrote");
        written.push(rel);
    }

    // Another invocation may have claimed the name while we were writing.
    collision_check(&target, name)?;
    staging.commit(&target).map_err(|source| ScaffoldError::PartialWriteFailure {
        path: target.clone(),
        source,
    })?;

    enter(ScaffoldState::Done, name);
    Ok(ScaffoldOutcome {
        name: name.to_string(),
        token: plan.token().to_string(),
        url: plan.url().to_string(),
        path: target,
        files: written,
    })
}

/// Parse `.zetteldev` (`key=value` per line) of an existing experiment.
pub fn read_metadata(experiment_dir: &Path) -> Result<BTreeMap<String, String>, ScaffoldError> {
    let text = fs::read_to_string(experiment_dir.join(METADATA_FILE))?;
    Ok(parse_metadata(&text))
}

/// Metadata of the experiment folder `experiments_root/<name>`.
///
/// The name must be a plain folder name; it is never resolved outside the root.
pub fn show_experiment(
    experiments_root: &Path,
    name: &str,
) -> Result<BTreeMap<String, String>, ScaffoldError> {
    let identity = ExperimentIdentity::manual(name)?;
    let dir = experiments_root.join(identity.name());
    if !dir.is_dir() {
        return Err(ScaffoldError::UnknownExperiment(name.to_string()));
    }
    read_metadata(&dir).map_err(|e| match e {
        ScaffoldError::Io(source) => ScaffoldError::MetadataUnreadable {
            name: name.to_string(),
            source,
        },
        other => other,
    })
}

pub fn parse_metadata(text: &str) -> BTreeMap<String, String> {
    text.lines()
        .filter(|l| !l.trim().is_empty() && !l.trim_start().starts_with('#'))
        .filter_map(|l| l.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

//! Issue tracker collaborator: open-issue records fetched through the `gh` CLI.
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::ScaffoldError;
use crate::util::{ExecRequest, ExecService};

const LIST_LIMIT: &str = "200";
const FIELDS: &str = "number,title,body";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub number: u64,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub body: String,
}

fn null_as_empty<'de, D>(d: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

pub trait IssueSource {
    /// All open issues. Errors are `ExternalToolUnavailable`.
    fn list_open_issues(&self) -> Result<Vec<IssueRecord>, ScaffoldError>;

    /// A single issue by number; `Ok(None)` when the tracker answered but has no such issue.
    fn fetch_issue(&self, number: u64) -> Result<Option<IssueRecord>, ScaffoldError>;
}

/// Shells out to `gh` (or ZETTELDEV_GH) inside the project directory.
#[derive(Debug, Clone)]
pub struct GhIssueSource {
    program: String,
    project_root: PathBuf,
    exec: ExecService,
}

impl GhIssueSource {
    pub fn new(
        program: impl Into<String>,
        project_root: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            program: program.into(),
            project_root: project_root.into(),
            exec: ExecService::new(timeout),
        }
    }

    fn run_json(&self, args: &[&str]) -> Result<String, ScaffoldError> {
        if which::which(&self.program).is_err() {
            return Err(ScaffoldError::ExternalToolUnavailable(format!(
                "`{}` not found in PATH",
                self.program
            )));
        }
        let out = self
            .exec
            .run(
                ExecRequest::new(&self.program)
                    .args(args.iter().copied())
                    .cwd(&self.project_root)
                    .env("GH_PROMPT_DISABLED", "1")
                    .env("NO_COLOR", "1"),
            )
            .map_err(|e| ScaffoldError::ExternalToolUnavailable(format!("{:#}", e)))?;
        if !out.status.success() {
            let msg = out.stderr.lines().next().unwrap_or("").trim().to_string();
            return Err(ScaffoldError::ExternalToolUnavailable(format!(
                "`{} {}` exited with {}{}",
                self.program,
                args.first().copied().unwrap_or(""),
                out.status.code().map(|c| c.to_string()).unwrap_or_else(|| "signal".into()),
                if msg.is_empty() { String::new() } else { format!(": {}", msg) }
            )));
        }
        Ok(out.stdout)
    }
}

impl IssueSource for GhIssueSource {
    fn list_open_issues(&self) -> Result<Vec<IssueRecord>, ScaffoldError> {
        let stdout = self.run_json(&[
            "issue", "list", "--state", "open", "--json", FIELDS, "--limit", LIST_LIMIT,
        ])?;
        parse_issue_list(&stdout)
    }

    fn fetch_issue(&self, number: u64) -> Result<Option<IssueRecord>, ScaffoldError> {
        let n = number.to_string();
        match self.run_json(&["issue", "view", &n, "--json", FIELDS]) {
            Ok(stdout) => parse_issue(&stdout).map(Some),
            Err(e) => {
                tracing::debug!(number, error = %e, "issue lookup failed");
                Err(e)
            }
        }
    }
}

pub fn parse_issue_list(json: &str) -> Result<Vec<IssueRecord>, ScaffoldError> {
    let mut issues: Vec<IssueRecord> = serde_json::from_str(json.trim()).map_err(|e| {
        ScaffoldError::ExternalToolUnavailable(format!("malformed issue list: {}", e))
    })?;
    issues.sort_by_key(|i| i.number);
    Ok(issues)
}

pub fn parse_issue(json: &str) -> Result<IssueRecord, ScaffoldError> {
    serde_json::from_str(json.trim())
        .map_err(|e| ScaffoldError::ExternalToolUnavailable(format!("malformed issue: {}", e)))
}

/// In-memory issue tracker.
#[derive(Debug, Clone, Default)]
pub struct StaticIssueSource {
    issues: Option<Vec<IssueRecord>>,
}

impl StaticIssueSource {
    pub fn new(issues: Vec<IssueRecord>) -> Self {
        Self {
            issues: Some(issues),
        }
    }

    /// A tracker that fails every call, as when `gh` is missing.
    pub fn unavailable() -> Self {
        Self { issues: None }
    }

    fn all(&self) -> Result<&[IssueRecord], ScaffoldError> {
        self.issues
            .as_deref()
            .ok_or_else(|| ScaffoldError::ExternalToolUnavailable("no issue tracker".into()))
    }
}

impl IssueSource for StaticIssueSource {
    fn list_open_issues(&self) -> Result<Vec<IssueRecord>, ScaffoldError> {
        let mut v = self.all()?.to_vec();
        v.sort_by_key(|i| i.number);
        Ok(v)
    }

    fn fetch_issue(&self, number: u64) -> Result<Option<IssueRecord>, ScaffoldError> {
        Ok(self.all()?.iter().find(|i| i.number == number).cloned())
    }
}

/// Web URL of the `origin` remote, e.g. `https://github.com/o/r`.
pub fn repo_web_url(project_root: &Path) -> Option<String> {
    let out = ExecService::new(Duration::from_secs(5))
        .run(
            ExecRequest::new("git")
                .args(["remote", "get-url", "origin"])
                .cwd(project_root),
        )
        .ok()?;
    if !out.status.success() {
        return None;
    }
    remote_to_web_url(out.stdout.trim())
}

/// Convert an origin remote (`git@host:o/r.git`, `ssh://git@host/o/r.git`,
/// `https://host/o/r.git`) to its web URL `https://host/o/r`.
pub fn remote_to_web_url(remote: &str) -> Option<String> {
    let remote = remote.trim();
    let (host, path) = if let Some(rest) = remote
        .strip_prefix("https://")
        .or_else(|| remote.strip_prefix("http://"))
        .or_else(|| remote.strip_prefix("ssh://"))
    {
        let rest = rest.rsplit_once('@').map(|(_, r)| r).unwrap_or(rest);
        let (host, path) = rest.split_once('/')?;
        // ssh://host:22/path carries a port; web URLs do not.
        (host.split(':').next().unwrap_or(host), path)
    } else if let Some((user_host, path)) = remote.split_once(':') {
        let host = user_host.rsplit_once('@').map(|(_, h)| h).unwrap_or(user_host);
        (host, path)
    } else {
        return None;
    };
    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    if host.is_empty() || path.is_empty() {
        return None;
    }
    Some(format!("https://{}/{}", host, path))
}

/// Link text for an issue: full URL when the remote is known, `#<n>` otherwise.
pub fn issue_link(web_url: Option<&str>, number: u64) -> String {
    match web_url {
        Some(base) => format!("{}/issues/{}", base, number),
        None => format!("#{}", number),
    }
}

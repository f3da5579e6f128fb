//! Project configuration: base URL from `pyproject.toml` (`[tool.zetteldev]`) and env overrides.
//!
//! Loading never fails; anything unreadable falls back to defaults with a warning.
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const PROJECT_DESCRIPTOR: &str = "pyproject.toml";
const DEFAULT_ISSUE_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Default, Deserialize)]
struct PyProject {
    #[serde(default)]
    tool: Option<ToolTable>,
}

#[derive(Debug, Default, Deserialize)]
struct ToolTable {
    #[serde(default)]
    zetteldev: Option<ZetteldevTable>,
}

#[derive(Debug, Default, Deserialize)]
struct ZetteldevTable {
    #[serde(default)]
    base_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseUrlSource {
    Env,
    ProjectFile,
    Default,
}

impl BaseUrlSource {
    pub fn describe(&self) -> &'static str {
        match self {
            BaseUrlSource::Env => "ZETTELDEV_BASE_URL",
            BaseUrlSource::ProjectFile => PROJECT_DESCRIPTOR,
            BaseUrlSource::Default => "built-in default",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub base_url: String,
    pub base_url_source: BaseUrlSource,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            base_url_source: BaseUrlSource::Default,
        }
    }
}

impl ProjectConfig {
    /// Resolve the base URL: ZETTELDEV_BASE_URL > pyproject.toml > default.
    pub fn load(project_root: &Path) -> Self {
        if let Ok(v) = env::var("ZETTELDEV_BASE_URL") {
            match validate_base_url(&v) {
                Some(u) => {
                    return Self {
                        base_url: u,
                        base_url_source: BaseUrlSource::Env,
                    }
                }
                None if !v.trim().is_empty() => {
                    tracing::warn!(value = %v, "ignoring invalid ZETTELDEV_BASE_URL");
                }
                None => {}
            }
        }
        match base_url_from_descriptor(&project_root.join(PROJECT_DESCRIPTOR)) {
            Some(u) => Self {
                base_url: u,
                base_url_source: BaseUrlSource::ProjectFile,
            },
            None => Self::default(),
        }
    }

    /// Program invoked as the issue tracker (ZETTELDEV_GH, default `gh`).
    pub fn issue_command() -> String {
        env::var("ZETTELDEV_GH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "gh".to_string())
    }

    /// Upper bound for a single issue-tracker invocation (ZETTELDEV_ISSUE_TIMEOUT_SECS).
    pub fn issue_timeout() -> Duration {
        let secs = env::var("ZETTELDEV_ISSUE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_ISSUE_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }
}

fn base_url_from_descriptor(path: &Path) -> Option<String> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "no project descriptor");
            return None;
        }
    };
    let parsed: PyProject = match toml::from_str(&text) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "malformed project descriptor; using default base URL"
            );
            return None;
        }
    };
    let raw = parsed.tool?.zetteldev?.base_url?;
    let valid = validate_base_url(&raw);
    if valid.is_none() {
        tracing::warn!(value = %raw, "ignoring invalid tool.zetteldev.base_url");
    }
    valid
}

/// Accept absolute http(s) URLs only; returns the trimmed value without trailing '/'.
pub fn validate_base_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let parsed = url::Url::parse(trimmed).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return None;
    }
    Some(trimmed.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_base_url_is_read() {
        let td = tempfile::tempdir().expect("tmpdir");
        fs::write(
            td.path().join(PROJECT_DESCRIPTOR),
            "[project]\nname = \"demo\"\n\n[tool.zetteldev]\nbase_url = \"https://lab.example.org/\"\n",
        )
        .expect("write");
        assert_eq!(
            base_url_from_descriptor(&td.path().join(PROJECT_DESCRIPTOR)).as_deref(),
            Some("https://lab.example.org")
        );
    }

    #[test]
    fn test_missing_or_malformed_descriptor_falls_back() {
        let td = tempfile::tempdir().expect("tmpdir");
        let p = td.path().join(PROJECT_DESCRIPTOR);
        assert_eq!(base_url_from_descriptor(&p), None);
        fs::write(&p, "[tool.zetteldev\nbase_url = ").expect("write");
        assert_eq!(base_url_from_descriptor(&p), None);
        fs::write(&p, "[tool.other]\nbase_url = \"https://x.org\"\n").expect("write");
        assert_eq!(base_url_from_descriptor(&p), None);
        fs::write(&p, "[tool.zetteldev]\nbase_url = 5\n").expect("write");
        assert_eq!(base_url_from_descriptor(&p), None);
    }

    #[test]
    fn test_load_records_where_the_base_url_came_from() {
        if env::var_os("ZETTELDEV_BASE_URL").is_some() {
            return;
        }
        let td = tempfile::tempdir().expect("tmpdir");
        let cfg = ProjectConfig::load(td.path());
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.base_url_source, BaseUrlSource::Default);

        fs::write(
            td.path().join(PROJECT_DESCRIPTOR),
            "[tool.zetteldev]\nbase_url = \"https://notes.example.com\"\n",
        )
        .expect("write");
        let cfg = ProjectConfig::load(td.path());
        assert_eq!(cfg.base_url, "https://notes.example.com");
        assert_eq!(cfg.base_url_source, BaseUrlSource::ProjectFile);
        assert_eq!(cfg.base_url_source.describe(), "pyproject.toml");
    }

    #[test]
    fn test_validate_base_url() {
        assert_eq!(
            validate_base_url(" http://localhost:8000 ").as_deref(),
            Some("http://localhost:8000")
        );
        assert_eq!(validate_base_url("ftp://host"), None);
        assert_eq!(validate_base_url("not a url"), None);
        assert_eq!(validate_base_url(""), None);
    }
}

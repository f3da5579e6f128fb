//! Experiment identity: slugs, issue-number bookkeeping and the layered resolution
//! from CLI input / issue tracker / interactive answers to exactly one name.
//!
//! Resolution order:
//! - integer argument: issue reference (collision by issue number, then lookup)
//! - other argument: manual name, used verbatim
//! - no argument on a terminal: pick an open issue without an experiment, or skip and type a name
//! - no argument otherwise: list the open issues without experiments; no scaffolding
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::errors::ScaffoldError;
use crate::issues::{IssueRecord, IssueSource};
use crate::util::reject_newlines;

pub const MAX_SLUG_LEN: usize = 50;

/// Lowercase, drop everything but word characters/whitespace/hyphens, turn separator runs
/// into one hyphen, trim hyphens, cap at MAX_SLUG_LEN characters.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_sep = false;
    for ch in lowered.chars() {
        if ch.is_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('-');
            }
            pending_sep = false;
            out.push(ch);
        } else if ch == '-' || ch == '_' || ch.is_whitespace() {
            pending_sep = true;
        }
    }
    if out.chars().count() > MAX_SLUG_LEN {
        out = out.chars().take(MAX_SLUG_LEN).collect();
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentitySource {
    Manual,
    Issue,
}

/// Canonical identity of one experiment; immutable once resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperimentIdentity {
    name: String,
    source: IdentitySource,
    issue_number: Option<u64>,
    issue_title: Option<String>,
    issue_body: Option<String>,
}

impl ExperimentIdentity {
    /// Explicit name, used verbatim once it is known to be a single folder name.
    pub fn manual(name: &str) -> Result<Self, ScaffoldError> {
        validate_name(name)?;
        Ok(Self {
            name: name.to_string(),
            source: IdentitySource::Manual,
            issue_number: None,
            issue_title: None,
            issue_body: None,
        })
    }

    /// `<number>-<slug(title)>`, or just `<number>` when the title has no word characters.
    pub fn from_issue(issue: &IssueRecord) -> Self {
        let slug = slugify(&issue.title);
        let name = if slug.is_empty() {
            issue.number.to_string()
        } else {
            format!("{}-{}", issue.number, slug)
        };
        Self {
            name,
            source: IdentitySource::Issue,
            issue_number: Some(issue.number),
            issue_title: Some(issue.title.clone()),
            issue_body: Some(issue.body.clone()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> IdentitySource {
        self.source
    }

    pub fn issue_number(&self) -> Option<u64> {
        self.issue_number
    }

    pub fn issue_title(&self) -> Option<&str> {
        self.issue_title.as_deref()
    }

    pub fn issue_body(&self) -> Option<&str> {
        self.issue_body.as_deref()
    }

    /// Name as an ASCII Python identifier fragment (`my-test` -> `my_test`).
    pub fn ident(&self) -> String {
        self.name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect()
    }
}

fn validate_name(name: &str) -> Result<(), ScaffoldError> {
    let invalid = name.trim().is_empty()
        || name != name.trim()
        || name.contains('/')
        || name.contains('\\')
        || name == "."
        || name == ".."
        || reject_newlines(name, "experiment name").is_err();
    if invalid {
        return Err(ScaffoldError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Parse a folder name of the form `<digits>` or `<digits>-...`.
pub fn folder_issue_number(folder: &str) -> Option<u64> {
    let digits = folder.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let rest = &folder[digits..];
    if !(rest.is_empty() || rest.starts_with('-')) {
        return None;
    }
    folder[..digits].parse().ok()
}

/// Issue numbers already encoded by experiment folders, mapped to the folder name.
pub fn scaffolded_issue_numbers(
    experiments_root: &Path,
) -> Result<BTreeMap<u64, String>, ScaffoldError> {
    let mut found = BTreeMap::new();
    let entries = match fs::read_dir(experiments_root) {
        Ok(e) => e,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(found),
        Err(e) => return Err(e.into()),
    };
    for entry in entries.flatten() {
        if !entry.path().is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if let Some(n) = folder_issue_number(&name) {
            // Deterministic pick when two folders share a number.
            found
                .entry(n)
                .and_modify(|existing: &mut String| {
                    if name < *existing {
                        *existing = name.clone();
                    }
                })
                .or_insert(name);
        }
    }
    Ok(found)
}

/// Open issues that do not yet have an experiment folder, ordered by number.
pub fn available_issues(
    mut issues: Vec<IssueRecord>,
    scaffolded: &BTreeMap<u64, String>,
) -> Vec<IssueRecord> {
    issues.retain(|i| !scaffolded.contains_key(&i.number));
    issues.sort_by_key(|i| i.number);
    issues.dedup_by_key(|i| i.number);
    issues
}

/// What the user asked for on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetInput {
    None,
    Issue(u64),
    Name(String),
}

impl TargetInput {
    /// Integer literals (optionally `#`-prefixed) are issue references; anything else is a name.
    pub fn parse(arg: Option<&str>) -> Self {
        let Some(raw) = arg else {
            return TargetInput::None;
        };
        let trimmed = raw.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(n) = digits.parse::<u64>() {
                return TargetInput::Issue(n);
            }
        }
        TargetInput::Name(raw.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueChoice {
    Issue(u64),
    Skip,
}

/// Interactive questions asked while resolving an identity.
pub trait Prompter {
    fn choose_issue(&mut self, issues: &[IssueRecord]) -> Result<IssueChoice, ScaffoldError>;
    fn ask_name(&mut self) -> Result<String, ScaffoldError>;
}

/// Numbered prompts over a line reader/writer pair (stdin/stderr in the binary).
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompter<io::StdinLock<'static>, io::Stderr> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_answer(&mut self) -> Result<String, ScaffoldError> {
        let _ = self.output.flush();
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => Err(ScaffoldError::Cancelled),
            Ok(_) => Ok(line.trim().to_string()),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Err(ScaffoldError::Cancelled),
            Err(e) => Err(e.into()),
        }
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn choose_issue(&mut self, issues: &[IssueRecord]) -> Result<IssueChoice, ScaffoldError> {
        writeln!(self.output, "Select an issue to create an experiment for:")?;
        for (i, issue) in issues.iter().enumerate() {
            writeln!(self.output, "  {:>2}) #{} {}", i + 1, issue.number, issue.title)?;
        }
        writeln!(self.output, "   0) Skip, enter a name manually")?;
        loop {
            write!(self.output, "Choice [0-{}]: ", issues.len())?;
            let answer = self.read_answer()?;
            if answer.eq_ignore_ascii_case("s") || answer.eq_ignore_ascii_case("skip") {
                return Ok(IssueChoice::Skip);
            }
            match answer.parse::<usize>() {
                Ok(0) => return Ok(IssueChoice::Skip),
                Ok(k) if k <= issues.len() => {
                    return Ok(IssueChoice::Issue(issues[k - 1].number));
                }
                _ => writeln!(
                    self.output,
                    "Please enter a number between 0 and {}.",
                    issues.len()
                )?,
            }
        }
    }

    fn ask_name(&mut self) -> Result<String, ScaffoldError> {
        write!(self.output, "Enter a name for the new experiment: ")?;
        self.read_answer()
    }
}

/// Outcome of resolution: an identity to scaffold, or the informational issue listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ExperimentIdentity),
    Listed(Vec<IssueRecord>),
}

pub struct ResolveContext<'a> {
    pub experiments_root: &'a Path,
    pub issues: &'a dyn IssueSource,
    pub interactive: bool,
}

pub fn resolve(
    input: &TargetInput,
    ctx: &ResolveContext<'_>,
    prompter: &mut dyn Prompter,
) -> Result<Resolution, ScaffoldError> {
    match input {
        TargetInput::Name(name) => {
            ExperimentIdentity::manual(name).map(Resolution::Resolved)
        }
        TargetInput::Issue(n) => resolve_issue(*n, ctx).map(Resolution::Resolved),
        TargetInput::None if ctx.interactive => resolve_interactive(ctx, prompter),
        TargetInput::None => {
            let available = open_issues_without_experiments(ctx)?;
            Ok(Resolution::Listed(available))
        }
    }
}

fn resolve_issue(
    number: u64,
    ctx: &ResolveContext<'_>,
) -> Result<ExperimentIdentity, ScaffoldError> {
    let scaffolded = scaffolded_issue_numbers(ctx.experiments_root)?;
    if let Some(existing) = scaffolded.get(&number) {
        return Err(ScaffoldError::IssueAlreadyScaffolded {
            number,
            existing: existing.clone(),
        });
    }
    match ctx.issues.fetch_issue(number) {
        Ok(Some(issue)) => Ok(ExperimentIdentity::from_issue(&issue)),
        Ok(None) => Err(ScaffoldError::NotFound(number)),
        Err(ScaffoldError::ExternalToolUnavailable(why)) => {
            tracing::info!(number, reason = %why, "issue lookup unavailable");
            Err(ScaffoldError::NotFound(number))
        }
        Err(e) => Err(e),
    }
}

/// Tracker failures degrade to an empty list.
fn open_issues_without_experiments(
    ctx: &ResolveContext<'_>,
) -> Result<Vec<IssueRecord>, ScaffoldError> {
    let open = match ctx.issues.list_open_issues() {
        Ok(v) => v,
        Err(ScaffoldError::ExternalToolUnavailable(why)) => {
            tracing::info!(reason = %why, "no issues available");
            Vec::new()
        }
        Err(e) => return Err(e),
    };
    let scaffolded = scaffolded_issue_numbers(ctx.experiments_root)?;
    Ok(available_issues(open, &scaffolded))
}

fn resolve_interactive(
    ctx: &ResolveContext<'_>,
    prompter: &mut dyn Prompter,
) -> Result<Resolution, ScaffoldError> {
    let available = open_issues_without_experiments(ctx)?;
    if !available.is_empty() {
        if let IssueChoice::Issue(n) = prompter.choose_issue(&available)? {
            let issue = available
                .iter()
                .find(|i| i.number == n)
                .ok_or(ScaffoldError::NotFound(n))?;
            return Ok(Resolution::Resolved(ExperimentIdentity::from_issue(issue)));
        }
    }
    let name = prompter.ask_name()?;
    if name.trim().is_empty() {
        return Err(ScaffoldError::InputMissing);
    }
    ExperimentIdentity::manual(&name).map(Resolution::Resolved)
}

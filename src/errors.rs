//! Error mapping guide:
//! - Every abort is a single-line, user-facing message (Display).
//! - Map io::ErrorKind::NotFound to exit code 127; cancellation to 130; all others to 1.
//! - AlreadyExists must be raised before any filesystem mutation.
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Map an io::Error to a process exit code:
/// - 127 for NotFound (command or path not found)
/// - 1 for all other errors
pub fn exit_code_for_io_error(e: &io::Error) -> u8 {
    if e.kind() == io::ErrorKind::NotFound {
        127
    } else {
        1
    }
}

#[derive(Debug)]
pub enum ScaffoldError {
    /// No name or issue could be resolved from the invocation.
    InputMissing,
    /// A manual name that cannot be used as a single folder name.
    InvalidName(String),
    /// Issue number could not be fetched.
    NotFound(u64),
    /// Target experiment folder is already present.
    AlreadyExists(String),
    /// No experiment folder with this name.
    UnknownExperiment(String),
    /// Experiment folder without a readable metadata file.
    MetadataUnreadable { name: String, source: io::Error },
    /// An experiment folder already encodes this issue number.
    IssueAlreadyScaffolded { number: u64, existing: String },
    /// Issue tracker command missing, failing, timing out or producing garbage.
    ExternalToolUnavailable(String),
    /// Interactive prompt interrupted or closed.
    Cancelled,
    MissingParam {
        template: &'static str,
        param: &'static str,
    },
    /// OS random source unavailable.
    Random(String),
    /// Disk error while populating the experiment folder.
    PartialWriteFailure { path: PathBuf, source: io::Error },
    Io(io::Error),
}

impl fmt::Display for ScaffoldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScaffoldError::InputMissing => {
                write!(f, "No experiment name provided. Pass a name or an issue number.")
            }
            ScaffoldError::InvalidName(name) => write!(
                f,
                "Invalid experiment name '{}': must be non-empty and must not contain path separators.",
                name.escape_default()
            ),
            ScaffoldError::NotFound(n) => write!(
                f,
                "Issue #{} not found or not accessible. Check the number and that `gh` is authenticated.",
                n
            ),
            ScaffoldError::AlreadyExists(name) => {
                write!(f, "Experiment '{}' already exists.", name)
            }
            ScaffoldError::UnknownExperiment(name) => {
                write!(f, "Experiment '{}' does not exist.", name)
            }
            ScaffoldError::MetadataUnreadable { name, source } => write!(
                f,
                "Experiment '{}' has no readable .zetteldev metadata: {}",
                name, source
            ),
            ScaffoldError::IssueAlreadyScaffolded { number, existing } => write!(
                f,
                "Experiment for issue #{} already exists: experiments/{}",
                number, existing
            ),
            ScaffoldError::ExternalToolUnavailable(why) => {
                write!(f, "issue tracker unavailable: {}", why)
            }
            ScaffoldError::Cancelled => write!(f, "aborted."),
            ScaffoldError::MissingParam { template, param } => write!(
                f,
                "template '{}' requires parameter '{}' which was not provided",
                template, param
            ),
            ScaffoldError::Random(why) => {
                write!(f, "failed to read from the OS random source: {}", why)
            }
            ScaffoldError::PartialWriteFailure { path, source } => {
                write!(f, "failed to write {}: {}", path.display(), source)
            }
            ScaffoldError::Io(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ScaffoldError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScaffoldError::PartialWriteFailure { source, .. } => Some(source),
            ScaffoldError::MetadataUnreadable { source, .. } => Some(source),
            ScaffoldError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ScaffoldError {
    fn from(e: io::Error) -> Self {
        ScaffoldError::Io(e)
    }
}

impl ScaffoldError {
    /// True for both flavours of collision (by name and by issue number).
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            ScaffoldError::AlreadyExists(_) | ScaffoldError::IssueAlreadyScaffolded { .. }
        )
    }
}

/// Convert ScaffoldError to a process exit code (parity with io::Error mapping).
pub fn exit_code_for_scaffold_error(e: &ScaffoldError) -> u8 {
    match e {
        ScaffoldError::Cancelled => 130,
        ScaffoldError::Io(ioe) => exit_code_for_io_error(ioe),
        ScaffoldError::PartialWriteFailure { source, .. } => exit_code_for_io_error(source),
        _ => 1,
    }
}

/// Render a user-facing string for ScaffoldError.
pub fn display_for_scaffold_error(e: &ScaffoldError) -> String {
    // Keep the message on one line even when an io error carries newlines.
    e.to_string().replace(&['\n', '\r'][..], " ")
}

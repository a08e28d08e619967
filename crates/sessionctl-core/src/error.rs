use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors shared across the whole crate family. Library crates return this
/// directly; `sessionctl-cli` maps it to process exit codes and user-facing
/// messages.
#[derive(Debug)]
pub enum Error {
    /// No session matched the given id, prefix, or path.
    NotFound(String),
    /// A prefix or partial identifier matched more than one session.
    ///
    /// Resolving the ambiguity (e.g. an interactive picker) is left to the
    /// caller; the core never prompts.
    Ambiguous(Vec<String>),
    /// A session file exists but could not be parsed as its agent's dialect.
    Malformed(String),
    /// A required external resource (store directory, git, agent CLI binary)
    /// is missing or inaccessible.
    Unavailable(String),
    /// An LLM analysis worker did not respond within its deadline.
    WorkerTimeout,
    /// An LLM analysis worker replied, but its output did not parse as a
    /// verdict list.
    WorkerReplyUnparseable(String),
    Io(std::io::Error),
    Json(serde_json::Error),
    /// A feature was invoked but its runtime dependency (e.g. an agent CLI
    /// on PATH) is not installed.
    DependencyMissing(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound(what) => write!(f, "not found: {what}"),
            Error::Ambiguous(candidates) => {
                write!(f, "ambiguous identifier, {} candidates match", candidates.len())
            }
            Error::Malformed(msg) => write!(f, "malformed session data: {msg}"),
            Error::Unavailable(msg) => write!(f, "unavailable: {msg}"),
            Error::WorkerTimeout => write!(f, "analysis worker timed out"),
            Error::WorkerReplyUnparseable(raw) => {
                write!(f, "analysis worker reply could not be parsed: {raw}")
            }
            Error::Io(err) => write!(f, "IO error: {err}"),
            Error::Json(err) => write!(f, "JSON error: {err}"),
            Error::DependencyMissing(dep) => write!(f, "missing dependency: {dep}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

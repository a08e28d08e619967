use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by lineage, derivation, and export operations (spec §7).
#[derive(Debug)]
pub enum Error {
    NotFound(String),
    Ambiguous(Vec<String>),
    Malformed(String),
    Io(std::io::Error),
    Json(serde_json::Error),
    Provider(sessionctl_providers::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound(what) => write!(f, "not found: {what}"),
            Error::Ambiguous(candidates) => {
                write!(f, "ambiguous identifier, {} candidates match", candidates.len())
            }
            Error::Malformed(msg) => write!(f, "malformed session data: {msg}"),
            Error::Io(err) => write!(f, "IO error: {err}"),
            Error::Json(err) => write!(f, "JSON error: {err}"),
            Error::Provider(err) => write!(f, "provider error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Provider(err) => Some(err),
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

impl From<sessionctl_providers::Error> for Error {
    fn from(err: sessionctl_providers::Error) -> Self {
        Error::Provider(err)
    }
}
